//! Shared test utilities
//!
//! Scripted collaborators so sessions run without audio hardware or network.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use taskist::session::{
    Collaborators, Console, SessionOrchestrator, SessionSettings,
};
use taskist::tasks::{IntentParser, ParserConfig};
use taskist::voice::{
    AudioSink, AudioSource, CapturedAudio, SAMPLE_RATE, SpeechAudio, SpeechToText, TextToSpeech,
};
use taskist::{Error, Result};

/// Sample value of the frames a [`ScriptedSource`] streams while recording
pub const LIVE_SAMPLE: f32 = 0.1;

/// Sample value of the frame a [`ScriptedSource`] flushes after the stop
pub const FLUSH_SAMPLE: f32 = 0.5;

/// How the scripted microphone behaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// Stream frames until cancelled, then flush one more
    Frames,
    /// Record nothing at all
    Silent,
    /// Fail like an unplugged device
    Broken,
}

/// Microphone that streams constant frames
pub struct ScriptedSource {
    mode: SourceMode,
}

impl ScriptedSource {
    pub fn new(mode: SourceMode) -> Self {
        Self { mode }
    }
}

impl AudioSource for ScriptedSource {
    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn stream(
        &self,
        frames: mpsc::UnboundedSender<Vec<f32>>,
        cancel: CancellationToken,
    ) -> Result<()> {
        match self.mode {
            SourceMode::Broken => Err(Error::Audio("device unplugged".to_string())),
            SourceMode::Silent => {
                while !cancel.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(2));
                }
                Ok(())
            }
            SourceMode::Frames => {
                while !cancel.is_cancelled() {
                    let _ = frames.send(vec![LIVE_SAMPLE; 160]);
                    std::thread::sleep(Duration::from_millis(2));
                }
                // Tail of the device buffer arriving after the stop
                let _ = frames.send(vec![FLUSH_SAMPLE; 80]);
                Ok(())
            }
        }
    }
}

/// One scripted transcription result
#[derive(Debug, Clone)]
pub enum SttReply {
    Text(String),
    Fail,
    Hang,
}

/// Speech-to-text that replays a script
pub struct ScriptedStt {
    replies: Mutex<VecDeque<SttReply>>,
    calls: Mutex<usize>,
}

impl ScriptedStt {
    pub fn new(replies: Vec<SttReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| SttReply::Text((*t).to_string())).collect())
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SpeechToText for ScriptedStt {
    async fn transcribe(&self, audio: &CapturedAudio) -> Result<String> {
        assert!(!audio.is_empty(), "empty audio reached the transcriber");
        *self.calls.lock().unwrap() += 1;

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(SttReply::Text(text)) => Ok(text),
            Some(SttReply::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok("too late".to_string())
            }
            Some(SttReply::Fail) | None => {
                Err(Error::TranscriptionFailed("provider unavailable".to_string()))
            }
        }
    }
}

/// Text-to-speech that echoes the text as bytes
#[derive(Default)]
pub struct MockTts {
    fail: bool,
    spoken: Mutex<Vec<String>>,
}

impl MockTts {
    pub fn failing() -> Self {
        Self {
            fail: true,
            spoken: Mutex::new(Vec::new()),
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextToSpeech for MockTts {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        if self.fail {
            return Err(Error::SynthesisFailed("quota exceeded".to_string()));
        }
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(SpeechAudio::mp3(text.as_bytes().to_vec()))
    }
}

/// Speaker that records what it was asked to play
#[derive(Default)]
pub struct RecordingSink {
    fail: bool,
    played: Mutex<Vec<SpeechAudio>>,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            fail: true,
            played: Mutex::new(Vec::new()),
        }
    }

    pub fn played(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn play(&self, audio: &SpeechAudio) -> Result<()> {
        if self.fail {
            return Err(Error::PlaybackFailed("speaker disconnected".to_string()));
        }
        self.played.lock().unwrap().push(audio.clone());
        Ok(())
    }
}

/// Console that answers the continue prompt from a script
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<String>>,
    shown: Mutex<Vec<String>>,
    recordings: Mutex<usize>,
}

impl ScriptedConsole {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| (*a).to_string()).collect()),
            shown: Mutex::new(Vec::new()),
            recordings: Mutex::new(0),
        }
    }

    pub fn shown(&self) -> Vec<String> {
        self.shown.lock().unwrap().clone()
    }

    pub fn recordings(&self) -> usize {
        *self.recordings.lock().unwrap()
    }
}

#[async_trait]
impl Console for ScriptedConsole {
    fn show(&self, text: &str) {
        self.shown.lock().unwrap().push(text.to_string());
    }

    fn announce_recording(&self) {
        *self.recordings.lock().unwrap() += 1;
    }

    async fn wait_for_stop(&self) -> Result<()> {
        // Let the source produce a few frames before the stop
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(())
    }

    async fn ask_continue(&self) -> Result<Option<String>> {
        Ok(self.answers.lock().unwrap().pop_front())
    }
}

/// Handles to the scripted collaborators of a session under test
pub struct Harness {
    pub stt: Arc<ScriptedStt>,
    pub tts: Arc<MockTts>,
    pub sink: Arc<RecordingSink>,
    pub console: Arc<ScriptedConsole>,
}

impl Harness {
    pub fn new(stt: ScriptedStt, answers: &[&str]) -> Self {
        Self {
            stt: Arc::new(stt),
            tts: Arc::new(MockTts::default()),
            sink: Arc::new(RecordingSink::default()),
            console: Arc::new(ScriptedConsole::new(answers)),
        }
    }

    #[must_use]
    pub fn with_tts(mut self, tts: MockTts) -> Self {
        self.tts = Arc::new(tts);
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: RecordingSink) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Build a session on a scripted microphone
    pub fn session(&self, mode: SourceMode, settings: SessionSettings) -> SessionOrchestrator {
        let collaborators = Collaborators {
            source: Arc::new(ScriptedSource::new(mode)),
            stt: self.stt.clone(),
            tts: self.tts.clone(),
            sink: self.sink.clone(),
            console: self.console.clone(),
        };
        SessionOrchestrator::new(
            collaborators,
            IntentParser::new(ParserConfig::default()),
            settings,
        )
    }
}
