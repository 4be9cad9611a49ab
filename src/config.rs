use crate::defaults;
use crate::error::{Result, StreamscribeError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub segmenter: SegmenterConfig,
    pub scheduler: SchedulerConfig,
    pub stt: SttConfig,
}

/// Server mode: streaming segmentation or one-shot blob transcription.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ServerMode {
    #[default]
    Streaming,
    Oneshot,
}

impl std::fmt::Display for ServerMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerMode::Streaming => write!(f, "streaming"),
            ServerMode::Oneshot => write!(f, "oneshot"),
        }
    }
}

/// WebSocket server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub mode: ServerMode,
}

/// Segment boundary configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SegmenterConfig {
    pub min_segment_bytes: usize,
    pub silence_threshold_ms: u64,
    pub max_interval_ms: u64,
    pub final_flush_min_bytes: usize,
}

/// Transcription scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SchedulerConfig {
    pub poll_interval_ms: u64,
}

/// Speech-to-text backend configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SttConfig {
    pub command: String,
    pub language: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: defaults::LISTEN_ADDR.to_string(),
            mode: ServerMode::Streaming,
        }
    }
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            min_segment_bytes: defaults::MIN_SEGMENT_BYTES,
            silence_threshold_ms: defaults::SILENCE_THRESHOLD.as_millis() as u64,
            max_interval_ms: defaults::MAX_INTERVAL.as_millis() as u64,
            final_flush_min_bytes: defaults::FINAL_FLUSH_MIN_BYTES,
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: defaults::POLL_INTERVAL.as_millis() as u64,
        }
    }
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            command: defaults::DEFAULT_STT_COMMAND.to_string(),
            language: defaults::DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl SegmenterConfig {
    pub fn silence_threshold(&self) -> Duration {
        Duration::from_millis(self.silence_threshold_ms)
    }

    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StreamscribeError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                StreamscribeError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't
    /// exist. Invalid TOML is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(StreamscribeError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            Err(e) => Err(e),
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - STREAMSCRIBE_LISTEN → server.listen
    /// - STREAMSCRIBE_LANGUAGE → stt.language
    /// - STREAMSCRIBE_STT_COMMAND → stt.command
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(listen) = std::env::var("STREAMSCRIBE_LISTEN") {
            if !listen.is_empty() {
                self.server.listen = listen;
            }
        }

        if let Ok(language) = std::env::var("STREAMSCRIBE_LANGUAGE") {
            if !language.is_empty() {
                self.stt.language = language;
            }
        }

        if let Ok(command) = std::env::var("STREAMSCRIBE_STT_COMMAND") {
            if !command.is_empty() {
                self.stt.command = command;
            }
        }

        self
    }

    /// Check that the tunables make sense together.
    pub fn validate(&self) -> Result<()> {
        if self.segmenter.min_segment_bytes == 0 {
            return Err(StreamscribeError::ConfigInvalidValue {
                key: "segmenter.min_segment_bytes".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmenter.silence_threshold_ms == 0 {
            return Err(StreamscribeError::ConfigInvalidValue {
                key: "segmenter.silence_threshold_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.segmenter.max_interval_ms < self.segmenter.silence_threshold_ms {
            return Err(StreamscribeError::ConfigInvalidValue {
                key: "segmenter.max_interval_ms".to_string(),
                message: "must be at least the silence threshold".to_string(),
            });
        }
        if self.scheduler.poll_interval_ms == 0 {
            return Err(StreamscribeError::ConfigInvalidValue {
                key: "scheduler.poll_interval_ms".to_string(),
                message: "must be positive".to_string(),
            });
        }
        if self.stt.command.trim().is_empty() {
            return Err(StreamscribeError::ConfigInvalidValue {
                key: "stt.command".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/streamscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("streamscribe").join("config.toml"))
    }
}
