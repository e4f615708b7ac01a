//! Audio playback to speakers

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use super::SpeechAudio;
use super::resample::resample;
use crate::{Error, Result};

/// Plays synthesized speech
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Play audio to completion
    ///
    /// # Errors
    ///
    /// Returns `PlaybackFailed` if the audio cannot be decoded or played
    async fn play(&self, audio: &SpeechAudio) -> Result<()>;
}

/// Plays audio to the default output device
pub struct AudioPlayback {
    config: StreamConfig,
}

impl AudioPlayback {
    /// Create a new audio playback instance
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| Error::Audio(format!("no default output config: {e}")))?
            .config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self { config })
    }
}

#[async_trait]
impl AudioSink for AudioPlayback {
    async fn play(&self, audio: &SpeechAudio) -> Result<()> {
        let (samples, rate) = decode_mp3(audio.bytes())?;
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || {
            let samples = resample(&samples, rate, config.sample_rate.0)
                .map_err(|e| Error::PlaybackFailed(e.to_string()))?;
            play_samples_blocking(&config, samples)
        })
        .await
        .map_err(|e| Error::PlaybackFailed(format!("playback task failed: {e}")))?
    }
}

/// Play mono samples on every output channel, blocking until done
fn play_samples_blocking(config: &StreamConfig, samples: Vec<f32>) -> Result<()> {
    if samples.is_empty() {
        return Ok(());
    }

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::PlaybackFailed("no output device".to_string()))?;

    let channels = usize::from(config.channels);
    let sample_count = samples.len();
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));

    let samples_clone = Arc::clone(&samples);
    let position_clone = Arc::clone(&position);

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let pos = position_clone.fetch_add(1, Ordering::Relaxed);
                    let sample = samples_clone.get(pos).copied().unwrap_or(0.0);
                    frame.fill(sample);
                }
            },
            |err| {
                tracing::error!(error = %err, "audio playback error");
            },
            None,
        )
        .map_err(|e| Error::PlaybackFailed(e.to_string()))?;

    stream
        .play()
        .map_err(|e| Error::PlaybackFailed(e.to_string()))?;

    // Poll for completion with timeout
    let duration_ms = (sample_count as u64 * 1000) / u64::from(config.sample_rate.0.max(1));
    let start = Instant::now();
    let timeout = Duration::from_millis(duration_ms + 500);

    while position.load(Ordering::Relaxed) < sample_count {
        if start.elapsed() > timeout {
            tracing::warn!("playback did not finish in time");
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Small delay to ensure audio finishes
    std::thread::sleep(Duration::from_millis(100));

    drop(stream);
    tracing::debug!(samples = sample_count, "playback complete");

    Ok(())
}

/// Decode MP3 bytes to mono f32 samples and their sample rate
#[allow(clippy::cast_sign_loss)]
fn decode_mp3(mp3_data: &[u8]) -> Result<(Vec<f32>, u32)> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = 0_u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = frame.sample_rate as u32;
                if frame.channels == 2 {
                    // Stereo: average channels
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::PlaybackFailed(format!("MP3 decode error: {e}"))),
        }
    }

    if sample_rate == 0 {
        return Err(Error::PlaybackFailed("no MP3 frames in audio".to_string()));
    }

    Ok((samples, sample_rate))
}
