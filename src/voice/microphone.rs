//! Audio capture from microphone

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::capture::{AudioSource, SAMPLE_RATE};
use super::resample::to_mono;
use crate::{Error, Result};

/// Captures audio from the default input device
///
/// Prefers a 16kHz mono stream; otherwise records at the device's default
/// configuration and leaves resampling to WAV encoding.
pub struct CpalMicrophone {
    config: StreamConfig,
}

impl CpalMicrophone {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if audio device cannot be opened
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let preferred = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            });

        let config = match preferred {
            Some(supported) => supported.with_sample_rate(SampleRate(SAMPLE_RATE)).config(),
            None => device
                .default_input_config()
                .map_err(|e| Error::Audio(format!("no default input config: {e}")))?
                .config(),
        };

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "audio capture initialized"
        );

        Ok(Self { config })
    }
}

impl AudioSource for CpalMicrophone {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn stream(
        &self,
        frames: mpsc::UnboundedSender<Vec<f32>>,
        cancel: CancellationToken,
    ) -> Result<()> {
        // cpal streams are not Send, so the stream lives on this thread
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device".to_string()))?;

        let channels = self.config.channels;
        let stream = device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Receiver only goes away after the stream is dropped
                    let _ = frames.send(to_mono(data, channels));
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        tracing::debug!("microphone stream started");

        tokio::runtime::Handle::current().block_on(cancel.cancelled());

        drop(stream);
        tracing::debug!("microphone stream stopped");
        Ok(())
    }
}
