//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::transcript::{MAX_TRANSCRIPT_CAPACITY, MIN_TRANSCRIPT_CAPACITY};

/// Prefix for environment overrides, e.g. `CALLSTAGE__SESSION__TRANSCRIPT_CAPACITY=5`
pub const ENV_PREFIX: &str = "CALLSTAGE";

/// Where the reaction artwork referenced by the recording layout lives
pub const DEFAULT_ASSET_BASE_URL: &str =
    "https://raw.githubusercontent.com/daily-demos/vcs-chat-recording/main/src/assets";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub recording: RecordingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Chat lines kept in the recording overlay
    pub transcript_capacity: usize,
    /// Delay before a reaction overlay is cleared
    pub reaction_clear_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub layout_preset: String,
    pub asset_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            transcript_capacity: MAX_TRANSCRIPT_CAPACITY,
            reaction_clear_ms: 1000,
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            layout_preset: "custom".to_string(),
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl SessionConfig {
    pub fn transcript_capacity(&self) -> usize {
        self.transcript_capacity
            .clamp(MIN_TRANSCRIPT_CAPACITY, MAX_TRANSCRIPT_CAPACITY)
    }

    pub fn reaction_clear_delay(&self) -> Duration {
        Duration::from_millis(self.reaction_clear_ms)
    }
}

impl Config {
    /// Load defaults, then an optional TOML file, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ::config::ConfigError> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path).required(false));
        }

        builder
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
