//! Server configuration
//!
//! Settings are layered: built-in defaults, then environment variables,
//! then command line flags, and finally any `initializationOptions` the
//! editor sends with the `initialize` request.

use crate::error::{CnfError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default quiet period before re-validating a changed document
pub const DEFAULT_DEBOUNCE_MS: u64 = 100;

/// Default tracing filter
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable holding the tracing filter
pub const LOG_ENV: &str = "CNF_LSP_LOG";

/// Environment variable holding the debounce period in milliseconds
pub const DEBOUNCE_ENV: &str = "CNF_LSP_DEBOUNCE_MS";

/// Language server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Milliseconds to wait after the last change before publishing diagnostics
    pub debounce_ms: u64,
    /// Tracing filter directive (e.g. "info", "cnf_lsp=debug")
    pub log_filter: String,
    /// Write logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            log_file: None,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `CNF_LSP_LOG` and `CNF_LSP_DEBOUNCE_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(filter) = lookup(LOG_ENV) {
            if !filter.trim().is_empty() {
                config.log_filter = filter.trim().to_string();
            }
        }

        if let Some(raw) = lookup(DEBOUNCE_ENV) {
            config.debounce_ms = raw.trim().parse().map_err(|_| {
                CnfError::InvalidConfig(format!("{} must be a number of milliseconds, got {:?}", DEBOUNCE_ENV, raw))
            })?;
        }

        Ok(config)
    }

    /// Apply `initializationOptions` sent by the client.
    ///
    /// Only `debounceMs` is read. Logging is set up before the client
    /// connects, so the log filter and file stay as the process started
    /// them. Missing fields keep their current value; `null` is ignored.
    pub fn merge_initialization_options(&mut self, options: &serde_json::Value) -> Result<()> {
        if options.is_null() {
            return Ok(());
        }

        let overrides: ConfigOverrides = serde_json::from_value(options.clone())
            .map_err(|e| CnfError::InvalidConfig(format!("initializationOptions: {}", e)))?;

        if let Some(debounce_ms) = overrides.debounce_ms {
            self.debounce_ms = debounce_ms;
        }

        Ok(())
    }

    /// Debounce period as a [`Duration`]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Log file to use when `--log-file` is given without a path
    pub fn default_log_file() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("cnf-lsp")
            .join("cnf-lsp.log")
    }
}

/// Partial configuration accepted from the client
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigOverrides {
    debounce_ms: Option<u64>,
}
