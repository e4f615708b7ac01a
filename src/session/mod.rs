//! Interactive voice session
//!
//! One session per process run: record, transcribe, apply the command,
//! answer, then ask whether to go again.

mod console;
mod orchestrator;
mod state;

pub use console::{CONTINUE_PROMPT, Console, ContinueDecision, TerminalConsole, parse_continue};
pub use orchestrator::{
    Collaborators, RoundReport, SessionOrchestrator, SessionReport, SessionSettings,
};
pub use state::SessionState;
