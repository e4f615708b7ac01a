//! Session state machine

/// Where a session is in its round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Created, nothing recorded yet
    Idle,
    /// Microphone is recording
    Capturing,
    /// Recording is being transcribed
    Transcribing,
    /// Transcript is being turned into a command
    Parsing,
    /// Command is being applied to the task store
    Mutating,
    /// Response is being synthesized
    Synthesizing,
    /// Response audio is playing
    Playing,
    /// Waiting for the user to decide whether to go again
    AwaitingContinue,
    /// Session is over
    Terminated,
}

/// Every edge the session may take
const TRANSITIONS: &[(SessionState, SessionState)] = &[
    (SessionState::Idle, SessionState::Capturing),
    (SessionState::Capturing, SessionState::Transcribing),
    (SessionState::Capturing, SessionState::AwaitingContinue),
    (SessionState::Transcribing, SessionState::Parsing),
    (SessionState::Transcribing, SessionState::AwaitingContinue),
    (SessionState::Parsing, SessionState::Mutating),
    (SessionState::Mutating, SessionState::Synthesizing),
    (SessionState::Synthesizing, SessionState::Playing),
    (SessionState::Synthesizing, SessionState::AwaitingContinue),
    (SessionState::Playing, SessionState::AwaitingContinue),
    (SessionState::AwaitingContinue, SessionState::Capturing),
    (SessionState::AwaitingContinue, SessionState::Terminated),
];

impl SessionState {
    /// Whether the table has an edge from `self` to `next`
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        TRANSITIONS.contains(&(self, next))
    }

    /// Whether no further transitions are possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminated)
    }
}
