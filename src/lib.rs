//! Taskist - Voice-driven to-do list assistant
//!
//! This library provides the core functionality for Taskist:
//! - Voice processing (capture, STT, TTS, playback)
//! - Task lists and the command parser
//! - The interactive session state machine
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Session Orchestrator                 │
//! │   Capture  │  STT  │  Parse  │  TTS  │  Playback    │
//! └────────────────────┬────────────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────────────┐
//! │                    Task Store                        │
//! │   (user, category) → ordered task list              │
//! └─────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod tasks;
pub mod voice;

pub use config::Config;
pub use error::{Error, Result};
