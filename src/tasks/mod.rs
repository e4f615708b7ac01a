//! Task list domain
//!
//! Holds the in-memory task store, the deterministic intent parser that turns
//! transcripts into commands, and the formatter that phrases the outcome.

mod intent;
mod response;
mod store;

pub use intent::{Command, IntentParser, ParserConfig};
pub use response::{format_response, speech_text};
pub use store::{AddResult, CommandOutcome, RemoveResult, Task, TaskStore};

/// User the task lists belong to when no user is configured
pub const DEFAULT_USER_ID: &str = "default-user";

/// Category used when none is configured
pub const DEFAULT_CATEGORY: &str = "general";
