//! Terminal interaction

use std::io::BufRead;

use async_trait::async_trait;
use dialoguer::Input;

use crate::{Error, Result};

/// Prompt shown after every round
pub const CONTINUE_PROMPT: &str = "Continue? (y/n)";

/// User-facing text channel of a session
#[async_trait]
pub trait Console: Send + Sync {
    /// Display a line of text
    fn show(&self, text: &str);

    /// Tell the user recording has started and how to stop it
    fn announce_recording(&self);

    /// Wait until the user asks to stop recording
    ///
    /// # Errors
    ///
    /// Returns `Console` error if input cannot be read
    async fn wait_for_stop(&self) -> Result<()>;

    /// Ask whether to run another round
    ///
    /// Returns `None` at end of input.
    ///
    /// # Errors
    ///
    /// Returns `Console` error if input cannot be read
    async fn ask_continue(&self) -> Result<Option<String>>;
}

/// Answer to the continue prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContinueDecision {
    /// Run another round
    Continue,
    /// End the session
    Stop,
}

/// Interpret a continue answer
///
/// Only `y` and `yes` (any case, surrounding whitespace ignored) continue.
#[must_use]
pub fn parse_continue(answer: Option<&str>) -> ContinueDecision {
    match answer.map(|a| a.trim().to_lowercase()).as_deref() {
        Some("y" | "yes") => ContinueDecision::Continue,
        _ => ContinueDecision::Stop,
    }
}

/// Console on stdin/stdout
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl TerminalConsole {
    /// Create a terminal console
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Console for TerminalConsole {
    fn show(&self, text: &str) {
        println!("{text}");
    }

    fn announce_recording(&self) {
        println!("Recording your instruction! Press Enter to stop recording.");
    }

    async fn wait_for_stop(&self) -> Result<()> {
        tokio::task::spawn_blocking(|| -> Result<()> {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Console(format!("stdin task failed: {e}")))?
    }

    async fn ask_continue(&self) -> Result<Option<String>> {
        tokio::task::spawn_blocking(|| {
            Input::<String>::new()
                .with_prompt(CONTINUE_PROMPT)
                .allow_empty(true)
                .interact_text()
                .map(Some)
                .map_err(|e| Error::Console(e.to_string()))
        })
        .await
        .map_err(|e| Error::Console(format!("prompt task failed: {e}")))?
    }
}
