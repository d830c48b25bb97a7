// Run configuration loading

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

use crate::engine::validate::DEFAULT_DURATION_TOLERANCE;

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config file is empty: {}", .path.display())]
    Empty { path: PathBuf },

    #[error("Invalid JSON in config file {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid TOML in config file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Settings for one batch run. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncodingConfig {
    pub input_directory: PathBuf,
    pub output_directory: PathBuf,

    /// File name suffixes to transcode, matched case-insensitively
    pub file_extensions: Vec<String>,

    /// Requested codec (h264, x265, av1, ...), lowercase after load
    pub video_codec: String,

    /// Constant quality value passed to `-q`
    pub quality: f64,

    /// Audio bitrate in kbps passed to `-B`
    pub audio_bitrate: u32,

    /// Transcoder executable
    #[serde(default = "default_transcoder")]
    pub transcoder: String,

    /// Media prober executable
    #[serde(default = "default_prober")]
    pub prober: String,

    /// Allowed absolute difference between input and output duration
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance_seconds: f64,
}

fn default_transcoder() -> String {
    "HandBrakeCLI".to_string()
}

fn default_prober() -> String {
    "ffprobe".to_string()
}

fn default_duration_tolerance() -> f64 {
    DEFAULT_DURATION_TOLERANCE
}

impl EncodingConfig {
    /// Load and normalize the config file at `path`.
    ///
    /// `.toml` files are parsed as TOML, everything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {}", path.display());

        if !path.exists() {
            error!("Config file not found: {}", path.display());
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(path, &content)
    }

    /// Parse config content; `path` only decides the format and labels errors.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            error!("Config file is empty: {}", path.display());
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let parsed: Result<Self, ConfigError> = if is_toml {
            toml::from_str(content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_json::from_str(content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        };

        match parsed {
            Ok(config) => Ok(config.normalized()),
            Err(e) => {
                error!("{e}");
                error!("Content of {}:", path.display());
                error!("{content}");
                Err(e)
            }
        }
    }

    fn normalized(mut self) -> Self {
        self.video_codec = self.video_codec.trim().to_lowercase();
        self.file_extensions = self
            .file_extensions
            .iter()
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self.input_directory = expand_home(&self.input_directory);
        self.output_directory = expand_home(&self.output_directory);
        self
    }

    /// Whether `file_name` ends with one of the configured extensions
    pub fn matches_extension(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.file_extensions.iter().any(|ext| lower.ends_with(ext))
    }
}

/// Expand a leading `~` to the current user's home directory
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
