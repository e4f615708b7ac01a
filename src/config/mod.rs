//! Configuration management for Taskist

pub mod file;

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::tasks::{DEFAULT_CATEGORY, DEFAULT_USER_ID, ParserConfig};
use crate::voice::{SttProvider, TtsProvider};
use crate::{Error, Result};

use file::TaskistConfigFile;

/// Default timeout for a single STT or TTS request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default description of the assistant's role
pub const DEFAULT_ROLE: &str = "You are a helpful task management assistant. \
    You help create, organize, and manage the user's ToDo list.";

/// Taskist configuration
#[derive(Debug)]
pub struct Config {
    /// Which list the session works on
    pub tasks: TasksConfig,

    /// Command keywords for the intent parser
    pub commands: ParserConfig,

    /// Speech-to-text configuration
    pub stt: SttConfig,

    /// Text-to-speech configuration
    pub tts: TtsConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Task list scoping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasksConfig {
    /// User the lists belong to
    pub user_id: String,

    /// Active category
    pub category: String,

    /// Description of the assistant's role
    pub role: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            category: DEFAULT_CATEGORY.to_string(),
            role: DEFAULT_ROLE.to_string(),
        }
    }
}

/// Speech-to-text configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SttConfig {
    /// Provider backend
    pub provider: SttProvider,

    /// Model identifier
    pub model: String,

    /// Spoken language (ISO 639-1)
    pub language: String,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: SttProvider::Groq,
            model: SttProvider::Groq.default_model().to_string(),
            language: "en".to_string(),
            base_url: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Text-to-speech configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TtsConfig {
    /// Provider backend
    pub provider: TtsProvider,

    /// Voice identifier
    pub voice: String,

    /// Model identifier
    pub model: String,

    /// Provider output format
    pub output_format: String,

    /// Speed multiplier (0.25 to 4.0, `OpenAI` only)
    pub speed: f32,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for TtsConfig {
    fn default() -> Self {
        let provider = TtsProvider::ElevenLabs;
        Self {
            provider,
            voice: provider.default_voice().to_string(),
            model: provider.default_model().to_string(),
            output_format: provider.default_output_format().to_string(),
            speed: 1.0,
            base_url: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// Groq API key (Whisper STT)
    pub groq: Option<SecretString>,

    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<SecretString>,

    /// Deepgram API key (STT)
    pub deepgram: Option<SecretString>,

    /// `ElevenLabs` API key (TTS)
    pub elevenlabs: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if an explicit config file cannot be loaded or a value
    /// is invalid
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let fc = file::load_config_file(path)?;
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed file and an environment lookup
    ///
    /// Precedence is env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is unknown
    pub fn from_sources(
        fc: TaskistConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let defaults = TasksConfig::default();
        let tasks = TasksConfig {
            user_id: env("USER_ID")
                .or(fc.tasks.user_id)
                .unwrap_or(defaults.user_id),
            category: env("TODO_CATEGORY")
                .or(fc.tasks.category)
                .unwrap_or(defaults.category),
            role: env("TASKIST_ROLE")
                .or(fc.tasks.role)
                .unwrap_or(defaults.role),
        };

        let parser_defaults = ParserConfig::default();
        let commands = ParserConfig {
            add_prefixes: fc
                .commands
                .add_prefixes
                .unwrap_or(parser_defaults.add_prefixes),
            remove_prefixes: fc
                .commands
                .remove_prefixes
                .unwrap_or(parser_defaults.remove_prefixes),
            list_fillers: fc
                .commands
                .list_fillers
                .unwrap_or(parser_defaults.list_fillers),
        };

        // Model defaults follow the chosen provider
        let stt_provider = env("TASKIST_STT_PROVIDER")
            .or(fc.stt.provider)
            .map(|p| p.parse::<SttProvider>())
            .transpose()?
            .unwrap_or(SttProvider::Groq);
        let stt = SttConfig {
            provider: stt_provider,
            model: env("TASKIST_STT_MODEL")
                .or(fc.stt.model)
                .unwrap_or_else(|| stt_provider.default_model().to_string()),
            language: fc.stt.language.unwrap_or_else(|| "en".to_string()),
            base_url: fc.stt.base_url,
            timeout: fc
                .stt
                .timeout_secs
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        };

        let tts_provider = env("TASKIST_TTS_PROVIDER")
            .or(fc.tts.provider)
            .map(|p| p.parse::<TtsProvider>())
            .transpose()?
            .unwrap_or(TtsProvider::ElevenLabs);
        let tts = TtsConfig {
            provider: tts_provider,
            voice: env("TASKIST_TTS_VOICE")
                .or(fc.tts.voice)
                .unwrap_or_else(|| tts_provider.default_voice().to_string()),
            model: env("TASKIST_TTS_MODEL")
                .or(fc.tts.model)
                .unwrap_or_else(|| tts_provider.default_model().to_string()),
            output_format: fc
                .tts
                .output_format
                .unwrap_or_else(|| tts_provider.default_output_format().to_string()),
            speed: fc.tts.speed.unwrap_or(1.0).clamp(0.25, 4.0),
            base_url: fc.tts.base_url,
            timeout: fc
                .tts
                .timeout_secs
                .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
        };

        // API keys (env > toml > None)
        let secret = |key: &str, file_value: Option<String>| {
            env(key)
                .or(file_value)
                .filter(|k| !k.is_empty())
                .map(SecretString::from)
        };
        let api_keys = ApiKeys {
            groq: secret("GROQ_API_KEY", fc.api_keys.groq),
            openai: secret("OPENAI_API_KEY", fc.api_keys.openai),
            deepgram: secret("DEEPGRAM_API_KEY", fc.api_keys.deepgram),
            elevenlabs: secret("ELEVENLABS_API_KEY", fc.api_keys.elevenlabs),
        };

        Ok(Self {
            tasks,
            commands,
            stt,
            tts,
            api_keys,
        })
    }

    /// API key for the configured STT provider
    ///
    /// # Errors
    ///
    /// Returns error if the key is not set
    pub fn stt_api_key(&self) -> Result<&SecretString> {
        let key = match self.stt.provider {
            SttProvider::Groq => self.api_keys.groq.as_ref(),
            SttProvider::OpenAi => self.api_keys.openai.as_ref(),
            SttProvider::Deepgram => self.api_keys.deepgram.as_ref(),
        };
        key.ok_or_else(|| missing_key(self.stt.provider.key_env()))
    }

    /// API key for the configured TTS provider
    ///
    /// # Errors
    ///
    /// Returns error if the key is not set
    pub fn tts_api_key(&self) -> Result<&SecretString> {
        let key = match self.tts.provider {
            TtsProvider::ElevenLabs => self.api_keys.elevenlabs.as_ref(),
            TtsProvider::OpenAi => self.api_keys.openai.as_ref(),
        };
        key.ok_or_else(|| missing_key(self.tts.provider.key_env()))
    }
}

fn missing_key(env: &str) -> Error {
    Error::Config(format!("{env} is not set (environment or config file)"))
}
