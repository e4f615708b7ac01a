//! Error types for Taskist

use thiserror::Error;

use crate::session::SessionState;

/// Result type alias for Taskist operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in Taskist
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio device error
    #[error("audio error: {0}")]
    Audio(String),

    /// Task text was empty after normalization
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A capture was started while another one is still recording
    #[error("capture already in progress")]
    AlreadyCapturing,

    /// Speech-to-text error
    #[error("transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Text-to-speech error
    #[error("synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Audio playback error
    #[error("playback failed: {0}")]
    PlaybackFailed(String),

    /// Session state machine was asked to take an edge it does not have
    #[error("invalid session transition: {from:?} -> {to:?}")]
    InvalidTransition {
        /// State the session was in
        from: SessionState,
        /// State that was requested
        to: SessionState,
    },

    /// Terminal interaction error
    #[error("console error: {0}")]
    Console(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
