//! Global configuration parsing and validation.
//!
//! The server runs with built-in defaults when no config file is given;
//! every key in the TOML file is optional. CLI flags override the file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{AppError, Result};

fn default_listen_addr() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    17_207
}

fn default_max_frame_bytes() -> usize {
    1_048_576
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Address the TCP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Port the TCP listener binds to; 0 requests an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum accepted frame payload size in bytes.
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    /// Per-read deadline in seconds for a session; 0 disables the deadline.
    ///
    /// A stalled peer otherwise blocks its session task indefinitely. The
    /// deadline is invisible to well-behaved peers.
    #[serde(default)]
    pub idle_timeout_seconds: u64,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// The `addr:port` string the listener binds to.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }

    /// The per-read deadline, or `None` when disabled.
    #[must_use]
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_seconds > 0).then(|| Duration::from_secs(self.idle_timeout_seconds))
    }

    fn validate(&self) -> Result<()> {
        if self.listen_addr.is_empty() {
            return Err(AppError::Config("listen_addr must not be empty".into()));
        }

        if self.max_frame_bytes == 0 {
            return Err(AppError::Config(
                "max_frame_bytes must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            max_frame_bytes: default_max_frame_bytes(),
            idle_timeout_seconds: 0,
        }
    }
}
