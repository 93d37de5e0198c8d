use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use whisperpress_audio::{BINARY_SIZE_CORRECTION, DEFAULT_CEILING_BYTES, DEFAULT_TARGET_SIZE_KB};

/// Transcription providers supported by the application
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Provider {
    #[default]
    #[serde(rename = "openai", alias = "open_ai")]
    #[strum(to_string = "openai", serialize = "open_ai")]
    OpenAI,
    #[serde(rename = "groq")]
    #[strum(to_string = "groq")]
    Groq,
    #[serde(rename = "fal", alias = "fal_ai")]
    #[strum(to_string = "fal", serialize = "fal_ai")]
    Fal,
}

/// How a provider wants to receive audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub accepts_raw_bytes: bool,
    pub accepts_url: bool,
}

impl Provider {
    pub fn capabilities(self) -> Capabilities {
        match self {
            Provider::OpenAI | Provider::Groq => Capabilities {
                accepts_raw_bytes: true,
                accepts_url: false,
            },
            Provider::Fal => Capabilities {
                accepts_raw_bytes: false,
                accepts_url: true,
            },
        }
    }

    /// Environment variable holding this provider's credential
    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
            Provider::Fal => "FAL_KEY",
        }
    }

    /// Name used in progress output
    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Groq => "Groq",
            Provider::Fal => "fal",
        }
    }
}

// ===== App Configuration =====

/// App configuration, optionally loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Provider used when none is given on the command line
    pub provider: Provider,
    /// Inputs strictly larger than this are compressed first
    pub ceiling_bytes: u64,
    /// Size the compressed file is planned for, in KiB
    pub target_size_kb: f64,
    /// ffmpeg executable (default: `ffmpeg` on PATH)
    pub ffmpeg_path: Option<PathBuf>,
    /// Language hint passed to providers that accept one
    pub language: Option<String>,
    /// Model override for providers that accept one
    pub model: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            ceiling_bytes: DEFAULT_CEILING_BYTES,
            target_size_kb: DEFAULT_TARGET_SIZE_KB,
            ffmpeg_path: None,
            language: None,
            model: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Load config from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;

        log::debug!("Loaded config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ceiling_bytes == 0 {
            return Err(ConfigError::Invalid("ceilingBytes must be positive".into()));
        }
        if !self.target_size_kb.is_finite() || self.target_size_kb <= 0.0 {
            return Err(ConfigError::Invalid("targetSizeKb must be positive".into()));
        }
        let planned_bytes = self.planned_size_bytes();
        if planned_bytes >= self.ceiling_bytes as f64 {
            return Err(ConfigError::Invalid(format!(
                "targetSizeKb {} plans about {:.0} bytes, which does not fit under ceilingBytes {}",
                self.target_size_kb, planned_bytes, self.ceiling_bytes
            )));
        }
        Ok(())
    }

    /// Bytes a constant-bitrate encode planned for `target_size_kb` is
    /// expected to reach, whatever the duration
    pub fn planned_size_bytes(&self) -> f64 {
        self.target_size_kb * 1000.0 / BINARY_SIZE_CORRECTION
    }
}
