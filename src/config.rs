//! Layered configuration (§10.3): defaults → file → `XG2G_`-prefixed
//! environment variables, via the `config` crate, same pattern the teacher's
//! `synctv-core::config::Config::load` uses.

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcePolicy {
    Any,
    LocalOnly,
    ReceiverOnly,
}

impl Default for SourcePolicy {
    fn default() -> Self {
        Self::Any
    }
}

impl SourcePolicy {
    #[must_use]
    pub const fn allows_local(self) -> bool {
        matches!(self, Self::Any | Self::LocalOnly)
    }

    #[must_use]
    pub const fn allows_receiver(self) -> bool {
        matches!(self, Self::Any | Self::ReceiverOnly)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    pub base_url: String,
    pub stream_port: u16,
    pub user: Option<String>,
    pub pass: Option<String>,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1".to_string(),
            stream_port: 8001,
            user: None,
            pass: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `"json"` or `"pretty"`.
    pub format: String,
    pub file_path: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub cadence_secs: u64,
    /// Force a heartbeat persist when `LastCheck` is this many multiples of
    /// `cadence_secs` stale, even with no drift change (§4.10).
    pub heartbeat_multiplier: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            cadence_secs: 60,
            heartbeat_multiplier: 5,
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub policy: SourcePolicy,
    pub path_mappings: Vec<(String, String)>,
    pub receiver: ReceiverConfig,
    /// Default 60s per the Open Question decision in DESIGN.md.
    pub probe_ttl_secs: u64,
    /// Bounded probe timeout (§4.5 step 9).
    pub probe_timeout_secs: u64,
    pub preparing_retry_after_s: u64,
    pub blocked_retry_after_s: u64,
    pub hls_root: PathBuf,
    pub verification: VerificationConfig,
    pub logging: LoggingConfig,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("policy", &self.policy)
            .field("path_mappings", &self.path_mappings)
            .field("receiver", &"<redacted>")
            .field("probe_ttl_secs", &self.probe_ttl_secs)
            .field("probe_timeout_secs", &self.probe_timeout_secs)
            .field("preparing_retry_after_s", &self.preparing_retry_after_s)
            .field("blocked_retry_after_s", &self.blocked_retry_after_s)
            .field("hls_root", &self.hls_root)
            .field("verification", &self.verification)
            .field("logging", &self.logging)
            .finish()
    }
}

impl Config {
    fn defaults() -> Self {
        Self {
            policy: SourcePolicy::Any,
            path_mappings: Vec::new(),
            receiver: ReceiverConfig::default(),
            probe_ttl_secs: 60,
            probe_timeout_secs: 120,
            preparing_retry_after_s: 5,
            blocked_retry_after_s: 30,
            hls_root: PathBuf::from("./hls"),
            verification: VerificationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Layered load: compiled-in defaults, an optional file, then
    /// `XG2G_`-prefixed environment overrides (e.g. `XG2G_PROBE_TTL_SECS`).
    pub fn load(config_file: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = Self::defaults();
        let mut builder = ConfigBuilder::builder().add_source(
            ConfigBuilder::try_from(&defaults)?,
        );

        if let Some(path) = config_file {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, config::FileFormat::Yaml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("XG2G")
                .separator("_")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    #[must_use]
    pub fn from_defaults() -> Self {
        Self::defaults()
    }
}
