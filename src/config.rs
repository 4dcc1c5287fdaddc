use crate::defaults;
use crate::error::Result;
use crate::session::IntervalPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub session: SessionConfig,
    pub summarize: SummarizeConfig,
    pub daemon: DaemonConfig,
}

/// Live session configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    /// Flush policy: "manual" or a duration like "10s", "5m".
    /// Kept as a string here; parsed once at the boundary.
    pub interval: String,
    /// Whether provisional recognitions enter the buffer.
    pub include_partials: bool,
    /// Label for fragments whose source names no speaker.
    pub speaker: String,
}

/// Summarization configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SummarizeConfig {
    pub template: String,
    pub context_chunks: usize,
    pub max_dispatch_retries: u32,
}

/// Daemon/IPC configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct DaemonConfig {
    /// Unix socket path; defaults to $XDG_RUNTIME_DIR/meetscribe.sock.
    pub socket: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: humantime::format_duration(defaults::PROCESSING_INTERVAL).to_string(),
            include_partials: false,
            speaker: defaults::UNKNOWN_SPEAKER.to_string(),
        }
    }
}

impl Default for SummarizeConfig {
    fn default() -> Self {
        Self {
            template: defaults::DEFAULT_TEMPLATE.to_string(),
            context_chunks: defaults::CONTEXT_CHUNKS,
            max_dispatch_retries: defaults::MAX_DISPATCH_RETRIES,
        }
    }
}

impl SessionConfig {
    /// Parses the configured interval into a policy.
    pub fn policy(&self) -> Result<IntervalPolicy> {
        IntervalPolicy::parse(&self.interval)
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match Self::load(path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Ok(Self::default())
                } else {
                    Err(e)
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - MEETSCRIBE_INTERVAL → session.interval
    /// - MEETSCRIBE_SPEAKER → session.speaker
    /// - MEETSCRIBE_TEMPLATE → summarize.template
    /// - MEETSCRIBE_SOCKET → daemon.socket
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(interval) = std::env::var("MEETSCRIBE_INTERVAL")
            && !interval.is_empty()
        {
            self.session.interval = interval;
        }

        if let Ok(speaker) = std::env::var("MEETSCRIBE_SPEAKER")
            && !speaker.is_empty()
        {
            self.session.speaker = speaker;
        }

        if let Ok(template) = std::env::var("MEETSCRIBE_TEMPLATE")
            && !template.is_empty()
        {
            self.summarize.template = template;
        }

        if let Ok(socket) = std::env::var("MEETSCRIBE_SOCKET")
            && !socket.is_empty()
        {
            self.daemon.socket = Some(PathBuf::from(socket));
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/meetscribe/config.toml on Linux
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meetscribe").join("config.toml"))
    }
}
