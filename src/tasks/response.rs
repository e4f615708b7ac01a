//! Confirmation phrasing for command outcomes

use super::{Command, CommandOutcome, Task};

/// Phrase the result of applying `command`
///
/// Pure: one template per command and outcome combination. Unknown commands
/// always get the apology, whatever the outcome.
#[must_use]
pub fn format_response(command: &Command, outcome: &CommandOutcome) -> String {
    if matches!(command, Command::Unknown(_)) {
        return UNRECOGNIZED.to_string();
    }

    match outcome {
        CommandOutcome::Added { task, added: true } => format!("Added '{task}' to your list."),
        CommandOutcome::Added { task, added: false } => {
            format!("'{task}' is already on your list.")
        }
        CommandOutcome::Removed { task, removed: true } => format!("Removed '{task}'."),
        CommandOutcome::Removed { task, removed: false } => {
            format!("Couldn't find '{task}' on your list.")
        }
        CommandOutcome::Listed(tasks) => read_back(tasks),
        CommandOutcome::Rejected(_) => "That task was empty, so nothing changed.".to_string(),
        CommandOutcome::Ignored => UNRECOGNIZED.to_string(),
    }
}

const UNRECOGNIZED: &str = "Sorry, I didn't understand that command.";

fn read_back(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "Your list is empty.".to_string();
    }

    let noun = if tasks.len() == 1 { "task" } else { "tasks" };
    let items = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| format!("{}. {task}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");

    format!("You have {} {noun}: {items}.", tasks.len())
}

/// Prepare display text for synthesis
///
/// Drops markdown emphasis markers that voices would otherwise read aloud.
#[must_use]
pub fn speech_text(text: &str) -> String {
    text.replace("**", "").trim().to_string()
}
