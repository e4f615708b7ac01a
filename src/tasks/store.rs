//! In-memory task store keyed by user and category

use std::collections::HashMap;
use std::fmt;

use super::Command;
use crate::{Error, Result};

/// A single to-do item
///
/// Text is stored with surrounding whitespace trimmed and inner whitespace
/// collapsed. Equality between tasks on the same list is decided by
/// [`Task::matches`], which ignores case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task(String);

impl Task {
    /// Create a task from free text
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty after normalization
    pub fn new(text: &str) -> Result<Self> {
        let normalized = normalize(text);
        if normalized.is_empty() {
            return Err(Error::InvalidInput("task text is empty".to_string()));
        }
        Ok(Self(normalized))
    }

    /// The task text as stored
    #[must_use]
    pub fn text(&self) -> &str {
        &self.0
    }

    /// Whether two tasks name the same item
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.0.to_lowercase() == other.0.to_lowercase()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Task {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for Task {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Task {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Result of [`TaskStore::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
    /// False when an equivalent task was already on the list
    pub added: bool,
}

/// Result of [`TaskStore::remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoveResult {
    /// False when no matching task was found
    pub removed: bool,
}

/// What happened when a command was applied to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Add command result
    Added {
        /// Task as it was requested
        task: Task,
        /// False if it was a duplicate
        added: bool,
    },
    /// Remove command result
    Removed {
        /// Task as it was requested
        task: Task,
        /// False if nothing matched
        removed: bool,
    },
    /// Snapshot of the list
    Listed(Vec<Task>),
    /// The payload was rejected as invalid input
    Rejected(String),
    /// Unknown command, store untouched
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Scope {
    user: String,
    category: String,
}

impl Scope {
    fn new(user: &str, category: &str) -> Self {
        Self {
            user: user.to_string(),
            category: category.to_string(),
        }
    }
}

/// Task lists for every (user, category) pair seen in a session
#[derive(Debug, Default)]
pub struct TaskStore {
    lists: HashMap<Scope, Vec<Task>>,
}

impl TaskStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task unless an equivalent one is already listed
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty after normalization
    pub fn add(&mut self, user: &str, category: &str, text: &str) -> Result<AddResult> {
        let task = Task::new(text)?;
        let list = self.lists.entry(Scope::new(user, category)).or_default();

        if list.iter().any(|existing| existing.matches(&task)) {
            tracing::debug!(user, category, task = %task, "duplicate task suppressed");
            return Ok(AddResult { added: false });
        }

        tracing::debug!(user, category, task = %task, "task added");
        list.push(task);
        Ok(AddResult { added: true })
    }

    /// Remove the task matching `text`
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the text is empty after normalization
    pub fn remove(&mut self, user: &str, category: &str, text: &str) -> Result<RemoveResult> {
        let task = Task::new(text)?;
        let Some(list) = self.lists.get_mut(&Scope::new(user, category)) else {
            return Ok(RemoveResult { removed: false });
        };

        let Some(index) = list.iter().position(|existing| existing.matches(&task)) else {
            tracing::debug!(user, category, task = %task, "task not found");
            return Ok(RemoveResult { removed: false });
        };

        list.remove(index);
        tracing::debug!(user, category, task = %task, "task removed");
        Ok(RemoveResult { removed: true })
    }

    /// Snapshot of the tasks for a user and category, in insertion order
    #[must_use]
    pub fn list(&self, user: &str, category: &str) -> Vec<Task> {
        self.lists
            .get(&Scope::new(user, category))
            .cloned()
            .unwrap_or_default()
    }

    /// Apply a parsed command to the list for `user` and `category`
    pub fn apply(&mut self, user: &str, category: &str, command: &Command) -> CommandOutcome {
        let outcome = match command {
            Command::Add(text) => Task::new(text).and_then(|task| {
                self.add(user, category, text)
                    .map(|r| CommandOutcome::Added { task, added: r.added })
            }),
            Command::Remove(text) => Task::new(text).and_then(|task| {
                self.remove(user, category, text)
                    .map(|r| CommandOutcome::Removed { task, removed: r.removed })
            }),
            Command::List => Ok(CommandOutcome::Listed(self.list(user, category))),
            Command::Unknown(_) => Ok(CommandOutcome::Ignored),
        };

        outcome.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "command rejected");
            CommandOutcome::Rejected(e.to_string())
        })
    }
}

/// Trim and collapse runs of whitespace into a single space
fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
