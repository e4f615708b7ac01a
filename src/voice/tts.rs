//! Text-to-speech (TTS) processing

use std::str::FromStr;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use super::stt::build_client;
use crate::config::TtsConfig;
use crate::{Error, Result};

/// Encoded speech returned by a synthesizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    mp3: Vec<u8>,
}

impl SpeechAudio {
    /// Wrap MP3-encoded bytes
    #[must_use]
    pub const fn mp3(bytes: Vec<u8>) -> Self {
        Self { mp3: bytes }
    }

    /// The encoded bytes
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.mp3
    }
}

/// Turns response text into audio
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Synthesize text to speech
    ///
    /// # Errors
    ///
    /// Returns `SynthesisFailed` if the provider cannot produce audio
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio>;
}

/// TTS provider backend
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TtsProvider {
    /// ElevenLabs
    ElevenLabs,
    /// `OpenAI`
    OpenAi,
}

impl TtsProvider {
    /// Model used when none is configured
    #[must_use]
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::ElevenLabs => "eleven_flash_v2_5",
            Self::OpenAi => "tts-1",
        }
    }

    /// Voice used when none is configured
    #[must_use]
    pub const fn default_voice(self) -> &'static str {
        match self {
            Self::ElevenLabs => "Xb7hH8MSUJpSbSDYk0k2",
            Self::OpenAi => "alloy",
        }
    }

    /// Output format used when none is configured
    #[must_use]
    pub const fn default_output_format(self) -> &'static str {
        match self {
            Self::ElevenLabs => "mp3_22050_32",
            Self::OpenAi => "mp3",
        }
    }

    /// API base URL used when none is configured
    #[must_use]
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::ElevenLabs => "https://api.elevenlabs.io/v1",
            Self::OpenAi => "https://api.openai.com/v1",
        }
    }

    /// Environment variable holding the API key
    #[must_use]
    pub const fn key_env(self) -> &'static str {
        match self {
            Self::ElevenLabs => "ELEVENLABS_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
        }
    }
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "elevenlabs" => Ok(Self::ElevenLabs),
            "openai" => Ok(Self::OpenAi),
            other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
        }
    }
}

/// Synthesizes speech over HTTP
pub struct HttpTextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    voice: String,
    speed: f32,
    model: String,
    output_format: String,
    base_url: String,
    provider: TtsProvider,
}

impl HttpTextToSpeech {
    /// Create a new TTS client
    ///
    /// # Errors
    ///
    /// Returns error if the API key is empty or the HTTP client cannot be built
    pub fn new(config: &TtsConfig, api_key: &SecretString) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(format!(
                "{} required for text-to-speech",
                config.provider.key_env()
            )));
        }

        Ok(Self {
            client: build_client(config.timeout)?,
            api_key: SecretString::from(api_key.expose_secret().to_owned()),
            voice: config.voice.clone(),
            speed: config.speed,
            model: config.model.clone(),
            output_format: config.output_format.clone(),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| config.provider.default_base_url().to_string())
                .trim_end_matches('/')
                .to_string(),
            provider: config.provider,
        })
    }

    /// Synthesize using `OpenAI` TTS
    async fn synthesize_openai(&self, text: &str) -> Result<SpeechAudio> {
        #[derive(serde::Serialize)]
        struct TtsRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            response_format: &'a str,
            speed: f32,
        }

        let request = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            response_format: &self.output_format,
            speed: self.speed,
        };

        let response = self
            .client
            .post(format!("{}/audio/speech", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::SynthesisFailed(e.to_string()))?;

        read_audio(response, "OpenAI").await
    }

    /// Synthesize using ElevenLabs TTS
    async fn synthesize_elevenlabs(&self, text: &str) -> Result<SpeechAudio> {
        #[derive(serde::Serialize)]
        struct VoiceSettings {
            stability: f32,
            similarity_boost: f32,
            style: f32,
            use_speaker_boost: bool,
        }

        #[derive(serde::Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
            voice_settings: VoiceSettings,
        }

        let request = ElevenLabsRequest {
            text,
            model_id: &self.model,
            voice_settings: VoiceSettings {
                stability: 0.0,
                similarity_boost: 1.0,
                style: 0.0,
                use_speaker_boost: true,
            },
        };

        let response = self
            .client
            .post(format!("{}/text-to-speech/{}", self.base_url, self.voice))
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::SynthesisFailed(e.to_string()))?;

        read_audio(response, "ElevenLabs").await
    }
}

#[async_trait]
impl TextToSpeech for HttpTextToSpeech {
    async fn synthesize(&self, text: &str) -> Result<SpeechAudio> {
        tracing::debug!(chars = text.len(), provider = ?self.provider, "starting synthesis");

        let audio = match self.provider {
            TtsProvider::OpenAi => self.synthesize_openai(text).await,
            TtsProvider::ElevenLabs => self.synthesize_elevenlabs(text).await,
        }?;

        tracing::debug!(audio_bytes = audio.bytes().len(), "synthesis complete");
        Ok(audio)
    }
}

async fn read_audio(response: reqwest::Response, provider: &str) -> Result<SpeechAudio> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status = %status, body = %body, "{provider} TTS error");
        return Err(Error::SynthesisFailed(format!(
            "{provider} TTS error {status}: {body}"
        )));
    }

    let audio = response
        .bytes()
        .await
        .map_err(|e| Error::SynthesisFailed(e.to_string()))?;

    if audio.is_empty() {
        return Err(Error::SynthesisFailed(format!("{provider} returned no audio")));
    }

    Ok(SpeechAudio::mp3(audio.to_vec()))
}
