//! Recording lifecycle
//!
//! A [`CaptureController`] runs one recording at a time. The audio source
//! streams frames from a blocking background task into a channel until the
//! stop token fires; the controller only reads the channel after that task
//! has been joined, so the returned buffer is always complete.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::resample::resample;
use crate::{Error, Result};

/// Sample rate for audio sent to speech-to-text (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// Provider of raw microphone frames
pub trait AudioSource: Send + Sync + 'static {
    /// Sample rate of the frames this source produces
    fn sample_rate(&self) -> u32;

    /// Stream mono frames into `frames` until `cancel` fires
    ///
    /// Runs on a blocking thread. Implementations flush anything still
    /// buffered before returning.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened or fails mid-stream
    fn stream(
        &self,
        frames: mpsc::UnboundedSender<Vec<f32>>,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// Audio captured during one recording
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedAudio {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate of `samples`
    pub sample_rate: u32,
}

impl CapturedAudio {
    /// Whether nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Length of the recording in seconds
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Encode as 16kHz mono WAV for STT APIs
    ///
    /// # Errors
    ///
    /// Returns error if resampling or WAV encoding fails
    pub fn to_wav(&self) -> Result<Vec<u8>> {
        let samples = resample(&self.samples, self.sample_rate, SAMPLE_RATE)?;
        samples_to_wav(&samples, SAMPLE_RATE)
    }
}

/// Recording lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// Nothing recorded or last recording already taken
    Idle,
    /// Source is streaming frames
    Recording,
    /// Recording finalized, audio ready to take
    Stopped,
}

struct Recording {
    cancel: CancellationToken,
    producer: JoinHandle<Result<()>>,
    frames: mpsc::UnboundedReceiver<Vec<f32>>,
}

/// Starts and stops recordings from an [`AudioSource`]
pub struct CaptureController {
    source: Arc<dyn AudioSource>,
    state: CaptureState,
    recording: Option<Recording>,
    captured: Option<CapturedAudio>,
}

impl CaptureController {
    /// Create a controller for the given source
    #[must_use]
    pub fn new(source: Arc<dyn AudioSource>) -> Self {
        Self {
            source,
            state: CaptureState::Idle,
            recording: None,
            captured: None,
        }
    }

    /// Current lifecycle state
    #[must_use]
    pub const fn state(&self) -> CaptureState {
        self.state
    }

    /// Begin recording on a background task
    ///
    /// Must be called from within a Tokio runtime. Any audio from a previous
    /// recording that was never taken is discarded.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCapturing` if a recording is in progress
    pub fn start_capture(&mut self) -> Result<()> {
        if self.state == CaptureState::Recording {
            return Err(Error::AlreadyCapturing);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let source = Arc::clone(&self.source);
        let token = cancel.clone();
        let producer = tokio::task::spawn_blocking(move || source.stream(tx, token));

        self.captured = None;
        self.recording = Some(Recording {
            cancel,
            producer,
            frames: rx,
        });
        self.state = CaptureState::Recording;

        tracing::debug!(sample_rate = self.source.sample_rate(), "audio capture started");
        Ok(())
    }

    /// Token that stops the current recording when cancelled
    ///
    /// Lets an external trigger request the stop; [`Self::signal_stop`] is
    /// still needed to finalize the buffer.
    #[must_use]
    pub fn stop_token(&self) -> Option<CancellationToken> {
        self.recording.as_ref().map(|r| r.cancel.clone())
    }

    /// Stop recording and finalize the buffer
    ///
    /// Waits for the source to flush and exit. Does nothing unless a
    /// recording is in progress.
    ///
    /// # Errors
    ///
    /// Returns an `Audio` error if the source failed; no audio is kept then
    pub async fn signal_stop(&mut self) -> Result<()> {
        let Some(recording) = self.recording.take() else {
            return Ok(());
        };

        let Recording {
            cancel,
            producer,
            mut frames,
        } = recording;
        cancel.cancel();

        let produced = producer
            .await
            .map_err(|e| Error::Audio(format!("capture task failed: {e}")));

        // The producer has exited, so everything it sent is already queued
        let mut samples = Vec::new();
        while let Ok(frame) = frames.try_recv() {
            samples.extend_from_slice(&frame);
        }

        if let Err(e) = produced.and_then(|r| r) {
            tracing::error!(error = %e, "audio capture failed");
            self.state = CaptureState::Idle;
            return Err(match e {
                Error::Audio(_) => e,
                other => Error::Audio(other.to_string()),
            });
        }

        let audio = CapturedAudio {
            samples,
            sample_rate: self.source.sample_rate(),
        };
        tracing::debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            "audio capture stopped"
        );

        self.captured = Some(audio);
        self.state = CaptureState::Stopped;
        Ok(())
    }

    /// Take the finalized recording
    ///
    /// Returns `None` unless the controller is stopped. Resets to idle.
    pub fn take_audio(&mut self) -> Option<CapturedAudio> {
        if self.state != CaptureState::Stopped {
            return None;
        }
        self.state = CaptureState::Idle;
        self.captured.take()
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        if let Some(recording) = &self.recording {
            recording.cancel.cancel();
        }
    }
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}
