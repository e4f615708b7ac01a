//! Session orchestration
//!
//! Drives rounds of capture, transcription, command handling, synthesis and
//! playback through the [`SessionState`] machine. Collaborators are injected
//! so a whole session can run against scripted implementations.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use super::console::{Console, ContinueDecision, parse_continue};
use super::state::SessionState;
use crate::config::{Config, DEFAULT_REQUEST_TIMEOUT};
use crate::tasks::{Command, IntentParser, Task, TaskStore, format_response, speech_text};
use crate::voice::{
    AudioSink, AudioSource, CaptureController, CapturedAudio, SpeechToText, TextToSpeech,
};
use crate::{Error, Result};

/// Per-session settings
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// User the task lists belong to
    pub user_id: String,
    /// Active category
    pub category: String,
    /// Description of the assistant's role
    pub role: String,
    /// Upper bound on one transcription request
    pub transcribe_timeout: Duration,
    /// Upper bound on one synthesis request
    pub synthesize_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        let tasks = crate::config::TasksConfig::default();
        Self {
            user_id: tasks.user_id,
            category: tasks.category,
            role: tasks.role,
            transcribe_timeout: DEFAULT_REQUEST_TIMEOUT,
            synthesize_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            user_id: config.tasks.user_id.clone(),
            category: config.tasks.category.clone(),
            role: config.tasks.role.clone(),
            transcribe_timeout: config.stt.timeout,
            synthesize_timeout: config.tts.timeout,
        }
    }
}

/// External collaborators a session talks to
#[derive(Clone)]
pub struct Collaborators {
    /// Microphone frames
    pub source: Arc<dyn AudioSource>,
    /// Transcription backend
    pub stt: Arc<dyn SpeechToText>,
    /// Synthesis backend
    pub tts: Arc<dyn TextToSpeech>,
    /// Speaker output
    pub sink: Arc<dyn AudioSink>,
    /// Text prompts and display
    pub console: Arc<dyn Console>,
}

/// What happened in one round
#[derive(Debug, Default)]
pub struct RoundReport {
    /// Transcript, if transcription succeeded
    pub transcript: Option<String>,
    /// Parsed command, if the round got that far
    pub command: Option<Command>,
    /// Response shown to the user
    pub response: Option<String>,
    /// Whether the response was played as audio
    pub spoken: bool,
    /// The failure that cut the round short or degraded it
    pub error: Option<Error>,
}

/// Summary of a finished session
#[derive(Debug)]
pub struct SessionReport {
    /// Every round that ran
    pub rounds: Vec<RoundReport>,
    /// State the session ended in
    pub final_state: SessionState,
    /// Final contents of the active list
    pub tasks: Vec<Task>,
}

/// Runs a voice session against a task store
pub struct SessionOrchestrator {
    collaborators: Collaborators,
    capture: CaptureController,
    parser: IntentParser,
    store: TaskStore,
    settings: SessionSettings,
    state: SessionState,
    trail: Vec<(SessionState, SessionState)>,
}

impl SessionOrchestrator {
    /// Create an idle session with an empty store
    #[must_use]
    pub fn new(
        collaborators: Collaborators,
        parser: IntentParser,
        settings: SessionSettings,
    ) -> Self {
        let capture = CaptureController::new(Arc::clone(&collaborators.source));
        Self {
            collaborators,
            capture,
            parser,
            store: TaskStore::new(),
            settings,
            state: SessionState::Idle,
            trail: Vec::new(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Task store owned by this session
    #[must_use]
    pub const fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Transitions taken so far, in order
    #[must_use]
    pub fn trail(&self) -> &[(SessionState, SessionState)] {
        &self.trail
    }

    /// Move to `next` if the state machine allows it
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if there is no such edge
    pub fn advance(&mut self, next: SessionState) -> Result<()> {
        let from = self.state;
        if !from.can_transition_to(next) {
            return Err(Error::InvalidTransition { from, to: next });
        }

        tracing::debug!(from = ?from, to = ?next, "session transition");
        self.trail.push((from, next));
        self.state = next;
        Ok(())
    }

    /// Run one round from capture up to the continue prompt
    ///
    /// Starts from `Idle` or `Capturing` and always ends in
    /// `AwaitingContinue`. Failures of collaborators are recorded in the
    /// report rather than returned.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if called in any other state
    pub async fn run_round(&mut self) -> Result<RoundReport> {
        if self.state == SessionState::Idle {
            self.advance(SessionState::Capturing)?;
        }
        if self.state != SessionState::Capturing {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: SessionState::Capturing,
            });
        }

        let mut report = RoundReport::default();

        let audio = match self.record().await {
            Ok(audio) => audio,
            Err(e) => {
                tracing::warn!(error = %e, "capture failed");
                self.collaborators
                    .console
                    .show("Sorry, the recording failed. Please try again.");
                report.error = Some(e);
                self.advance(SessionState::AwaitingContinue)?;
                return Ok(report);
            }
        };

        self.advance(SessionState::Transcribing)?;
        let transcript = match self.transcribe(&audio).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "transcription failed");
                self.collaborators
                    .console
                    .show("Sorry, I couldn't transcribe that. Please try again.");
                report.error = Some(e);
                self.advance(SessionState::AwaitingContinue)?;
                return Ok(report);
            }
        };
        self.collaborators
            .console
            .show(&format!("Here is the transcription: {transcript}"));

        self.advance(SessionState::Parsing)?;
        let command = self.parser.parse(&transcript);
        tracing::info!(command = command.kind(), "parsed command");

        self.advance(SessionState::Mutating)?;
        let outcome = self
            .store
            .apply(&self.settings.user_id, &self.settings.category, &command);
        let response = format_response(&command, &outcome);
        self.collaborators.console.show(&response);

        self.advance(SessionState::Synthesizing)?;
        let synthesized = with_timeout(
            self.settings.synthesize_timeout,
            self.collaborators.tts.synthesize(&speech_text(&response)),
            Error::SynthesisFailed,
        )
        .await;

        match synthesized {
            Ok(speech) => {
                self.advance(SessionState::Playing)?;
                match self.collaborators.sink.play(&speech).await {
                    Ok(()) => report.spoken = true,
                    Err(e) => {
                        tracing::warn!(error = %e, "playback failed, response shown as text");
                        report.error = Some(e);
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "synthesis failed, response shown as text");
                report.error = Some(e);
            }
        }

        self.advance(SessionState::AwaitingContinue)?;
        report.transcript = Some(transcript);
        report.command = Some(command);
        report.response = Some(response);
        Ok(report)
    }

    /// Ask whether to continue and take the matching transition
    ///
    /// Console errors and end of input end the session.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the session is awaiting an answer
    pub async fn prompt_continue(&mut self) -> Result<ContinueDecision> {
        if self.state != SessionState::AwaitingContinue {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: SessionState::Terminated,
            });
        }

        let decision = match self.collaborators.console.ask_continue().await {
            Ok(answer) => parse_continue(answer.as_deref()),
            Err(e) => {
                tracing::warn!(error = %e, "continue prompt failed, ending session");
                ContinueDecision::Stop
            }
        };

        match decision {
            ContinueDecision::Continue => self.advance(SessionState::Capturing)?,
            ContinueDecision::Stop => self.advance(SessionState::Terminated)?,
        }
        Ok(decision)
    }

    /// Run rounds until the user declines to continue
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the session was not idle
    pub async fn run(mut self) -> Result<SessionReport> {
        let session_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("session", id = %session_id);

        async move {
            tracing::info!(
                user = %self.settings.user_id,
                category = %self.settings.category,
                role = %self.settings.role,
                "session started"
            );

            let mut rounds = Vec::new();
            loop {
                rounds.push(self.run_round().await?);
                if self.prompt_continue().await? == ContinueDecision::Stop {
                    break;
                }
            }

            let tasks = self
                .store
                .list(&self.settings.user_id, &self.settings.category);
            tracing::info!(rounds = rounds.len(), tasks = tasks.len(), "session ended");

            Ok::<_, Error>(SessionReport {
                rounds,
                final_state: self.state,
                tasks,
            })
        }
        .instrument(span)
        .await
    }

    /// Record until the console reports a stop request
    async fn record(&mut self) -> Result<CapturedAudio> {
        self.capture.start_capture()?;
        self.collaborators.console.announce_recording();

        let waited = self.collaborators.console.wait_for_stop().await;
        // Always finalize so the source is released, even if the wait failed
        let stopped = self.capture.signal_stop().await;
        waited?;
        stopped?;

        self.capture
            .take_audio()
            .ok_or_else(|| Error::Audio("recording produced no buffer".to_string()))
    }

    async fn transcribe(&self, audio: &CapturedAudio) -> Result<String> {
        if audio.is_empty() {
            return Err(Error::TranscriptionFailed("no audio captured".to_string()));
        }

        let text = with_timeout(
            self.settings.transcribe_timeout,
            self.collaborators.stt.transcribe(audio),
            Error::TranscriptionFailed,
        )
        .await?;

        tracing::debug!(chars = text.len(), "transcription received");
        Ok(text)
    }
}

/// Bound `fut` by `limit`, reporting expiry through `on_timeout`
async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
    on_timeout: fn(String) -> Error,
) -> Result<T> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| on_timeout(format!("timed out after {}s", limit.as_secs_f32())))?
}
