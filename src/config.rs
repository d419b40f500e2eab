// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the email send limiter.
//!
//! The default quota is 100 emails per recipient per rolling 24 hours.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Quota configuration
    #[serde(default)]
    pub limiter: LimiterConfig,

    /// In-memory history store configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Per-recipient quota configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimiterConfig {
    /// Maximum emails per recipient per rolling 24h (default: 100).
    /// Zero disables limiting.
    #[serde(default = "default_max_emails_24h")]
    pub max_emails_24h: u32,

    /// Serialize overlapping sends per recipient inside the limiter
    /// (default: true). Disable only when the store or the caller already
    /// serializes per recipient.
    #[serde(default = "default_serialize_recipients")]
    pub serialize_recipients: bool,
}

/// Configuration for [`MemoryHistoryStore`](crate::store::MemoryHistoryStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Age after which a timestamp stops counting, in seconds (default: 86400)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format (default: json)
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Filter directive used when `RUST_LOG` is unset (default: info)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_max_emails_24h() -> u32 {
    100
}

fn default_serialize_recipients() -> bool {
    true
}

fn default_window_secs() -> u64 {
    24 * 60 * 60
}

fn default_log_format() -> LogFormat {
    LogFormat::Json
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limiter: LimiterConfig::default(),
            history: HistoryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self {
            max_emails_24h: default_max_emails_24h(),
            serialize_recipients: default_serialize_recipients(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            level: default_log_level(),
        }
    }
}

impl HistoryConfig {
    /// Get the history window duration
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `EMAIL_LIMIT_24H`: quota per recipient; negative values disable limiting
    /// - `EMAIL_SERIALIZE_RECIPIENTS`: `false`/`0` to stop serializing per recipient
    /// - `EMAIL_HISTORY_WINDOW_SECS`: memory store window in seconds
    /// - `LOG_FORMAT`: `json` or `pretty`
    ///
    /// Unset or unparsable variables fall back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parse a JSON configuration document.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let max_emails_24h = lookup("EMAIL_LIMIT_24H")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .map(clamp_threshold)
            .unwrap_or(defaults.limiter.max_emails_24h);

        let serialize_recipients = lookup("EMAIL_SERIALIZE_RECIPIENTS")
            .map(|v| matches!(v.trim(), "1" | "true" | "TRUE" | "yes"))
            .unwrap_or(defaults.limiter.serialize_recipients);

        let window_secs = lookup("EMAIL_HISTORY_WINDOW_SECS")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.history.window_secs);

        let format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            _ => defaults.logging.format,
        };

        Self {
            limiter: LimiterConfig {
                max_emails_24h,
                serialize_recipients,
            },
            history: HistoryConfig { window_secs },
            logging: LoggingConfig {
                format,
                ..defaults.logging
            },
        }
    }
}

/// Negative thresholds disable limiting, same as zero.
fn clamp_threshold(raw: i64) -> u32 {
    u32::try_from(raw.max(0)).unwrap_or(u32::MAX)
}
