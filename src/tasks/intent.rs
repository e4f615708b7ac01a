//! Deterministic intent parsing
//!
//! Transcripts are classified by fixed keyword prefixes, checked in a fixed
//! priority order: add, list, remove. The first match wins; there is no
//! scoring and no fuzzy matching, so the same transcript always yields the
//! same [`Command`].

/// A classified transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add the payload to the list
    Add(String),
    /// Read the list back
    List,
    /// Remove the payload from the list
    Remove(String),
    /// Anything else, carrying the transcript as received
    Unknown(String),
}

impl Command {
    /// Short name for logging
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::List => "list",
            Self::Remove(_) => "remove",
            Self::Unknown(_) => "unknown",
        }
    }
}

/// Keyword sets recognized by the parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Prefixes that introduce an add command
    pub add_prefixes: Vec<String>,
    /// Prefixes that introduce a remove command
    pub remove_prefixes: Vec<String>,
    /// Words allowed after "list"
    pub list_fillers: Vec<String>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            add_prefixes: vec!["add".to_string()],
            remove_prefixes: vec!["remove".to_string(), "delete".to_string()],
            list_fillers: [
                "my", "the", "all", "tasks", "task", "todos", "items", "please", "everything",
            ]
            .iter()
            .map(ToString::to_string)
            .collect(),
        }
    }
}

/// Keyword that triggers a list command
const LIST_KEYWORD: &str = "list";

/// Maps transcripts to commands
#[derive(Debug, Clone)]
pub struct IntentParser {
    add_prefixes: Vec<String>,
    remove_prefixes: Vec<String>,
    list_fillers: Vec<String>,
}

impl Default for IntentParser {
    fn default() -> Self {
        Self::new(ParserConfig::default())
    }
}

impl IntentParser {
    /// Create a parser with the given keyword sets
    ///
    /// Keywords are lowercased and trimmed; blank entries are dropped.
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        let clean = |words: Vec<String>| -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        };

        Self {
            add_prefixes: clean(config.add_prefixes),
            remove_prefixes: clean(config.remove_prefixes),
            list_fillers: clean(config.list_fillers),
        }
    }

    /// Classify a transcript
    ///
    /// Never fails: anything unrecognized becomes [`Command::Unknown`].
    #[must_use]
    pub fn parse(&self, transcript: &str) -> Command {
        let text = strip_sentence_end(transcript);

        let command = if let Some(rest) = match_prefix(&self.add_prefixes, text) {
            if rest.is_empty() {
                Command::Unknown(transcript.to_string())
            } else {
                Command::Add(rest.to_string())
            }
        } else if self.is_list(text) {
            Command::List
        } else if let Some(rest) = match_prefix(&self.remove_prefixes, text) {
            if rest.is_empty() {
                Command::Unknown(transcript.to_string())
            } else {
                Command::Remove(rest.to_string())
            }
        } else {
            Command::Unknown(transcript.to_string())
        };

        tracing::debug!(transcript, command = command.kind(), "parsed transcript");
        command
    }

    fn is_list(&self, text: &str) -> bool {
        let mut words = text
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()).to_lowercase());

        if words.next().as_deref() != Some(LIST_KEYWORD) {
            return false;
        }

        words.all(|w| w.is_empty() || self.list_fillers.contains(&w))
    }
}

/// Trim whitespace and the trailing punctuation recognizers append
fn strip_sentence_end(text: &str) -> &str {
    text.trim().trim_end_matches(['.', '!', '?']).trim_end()
}

fn match_prefix<'a>(prefixes: &[String], text: &'a str) -> Option<&'a str> {
    prefixes.iter().find_map(|p| strip_keyword(text, p))
}

/// Strip a case-insensitive `keyword` followed by whitespace from the start
/// of `text`, returning the trimmed remainder in its original case
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();

    for expected in keyword.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }

    let (idx, next) = chars.next()?;
    if !next.is_whitespace() {
        return None;
    }

    Some(text[idx..].trim())
}
