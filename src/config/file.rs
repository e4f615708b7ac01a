//! TOML configuration file loading
//!
//! Supports `~/.config/omni/taskist/config.toml` as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TaskistConfigFile {
    /// Task list scoping
    #[serde(default)]
    pub tasks: TasksFileConfig,

    /// Command keyword configuration
    #[serde(default)]
    pub commands: CommandsFileConfig,

    /// Speech-to-text configuration
    #[serde(default)]
    pub stt: SttFileConfig,

    /// Text-to-speech configuration
    #[serde(default)]
    pub tts: TtsFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,
}

/// Which list the session works on
#[derive(Debug, Default, Deserialize)]
pub struct TasksFileConfig {
    /// User the lists belong to
    pub user_id: Option<String>,

    /// Category (e.g. "personal", "work")
    pub category: Option<String>,

    /// Description of the assistant's role
    pub role: Option<String>,
}

/// Command keyword sets
#[derive(Debug, Default, Deserialize)]
pub struct CommandsFileConfig {
    /// Prefixes that add a task (e.g. ["add", "new task"])
    pub add_prefixes: Option<Vec<String>>,

    /// Prefixes that remove a task
    pub remove_prefixes: Option<Vec<String>>,

    /// Words allowed after "list"
    pub list_fillers: Option<Vec<String>>,
}

/// Speech-to-text configuration
#[derive(Debug, Default, Deserialize)]
pub struct SttFileConfig {
    /// Provider ("groq", "openai", "deepgram")
    pub provider: Option<String>,

    /// Model identifier (e.g. "whisper-large-v3-turbo")
    pub model: Option<String>,

    /// Spoken language (ISO 639-1)
    pub language: Option<String>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Text-to-speech configuration
#[derive(Debug, Default, Deserialize)]
pub struct TtsFileConfig {
    /// Provider ("elevenlabs", "openai")
    pub provider: Option<String>,

    /// Voice identifier
    pub voice: Option<String>,

    /// Model identifier
    pub model: Option<String>,

    /// Provider output format (e.g. "mp3_22050_32")
    pub output_format: Option<String>,

    /// Speed multiplier (`OpenAI` only)
    pub speed: Option<f32>,

    /// API base URL override
    pub base_url: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub groq: Option<String>,
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Load the TOML config file
///
/// An explicit `path` must exist and parse. Without one, the standard path is
/// tried and `TaskistConfigFile::default()` is returned if the file doesn't
/// exist or can't be parsed.
///
/// # Errors
///
/// Returns error if an explicit path cannot be read or parsed
pub fn load_config_file(path: Option<&Path>) -> Result<TaskistConfigFile> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), "loaded config file");
        return Ok(config);
    }

    let Some(path) = config_file_path() else {
        return Ok(TaskistConfigFile::default());
    };

    if !path.exists() {
        return Ok(TaskistConfigFile::default());
    }

    let config = match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TaskistConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TaskistConfigFile::default()
        }
    };

    Ok(config)
}

/// Return the config file path: `~/.config/omni/taskist/config.toml`
#[must_use]
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join("omni")
            .join("taskist")
            .join("config.toml")
    })
}
