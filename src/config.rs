//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Nested Slack configuration.
///
/// The bot token is loaded at runtime from the environment, not from the
/// TOML config file.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Channel where incident notifications are posted.
    #[serde(default)]
    pub channel_id: String,
    /// Bot user token used for posting messages (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

/// Cadence settings for the reconciliation jobs (seconds).
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct JobsConfig {
    /// Tick period for the assign-unassigned job.
    #[serde(default = "default_assign_interval")]
    pub assign_interval_seconds: u64,
    /// Tick period for the remind-unacknowledged job.
    #[serde(default = "default_remind_interval")]
    pub remind_interval_seconds: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            assign_interval_seconds: default_assign_interval(),
            remind_interval_seconds: default_remind_interval(),
        }
    }
}

fn default_assign_interval() -> u64 {
    60
}

fn default_remind_interval() -> u64 {
    600
}

fn default_http_port() -> u16 {
    3000
}

fn default_db_path() -> PathBuf {
    "oncall.db".into()
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// HTTP port for the REST transport.
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Slack connectivity settings.
    #[serde(default)]
    pub slack: SlackConfig,
    /// Reconciliation job cadences.
    #[serde(default)]
    pub jobs: JobsConfig,
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

    /// Load the Slack bot token from the `SLACK_BOT_TOKEN` environment
    /// variable.
    ///
    /// A missing token leaves notifications disabled rather than failing
    /// startup.
    pub fn load_credentials(&mut self) {
        match env::var("SLACK_BOT_TOKEN") {
            Ok(token) if !token.is_empty() => self.slack.bot_token = token,
            _ => warn!("SLACK_BOT_TOKEN not set; notifications disabled"),
        }
    }

    /// Whether a Slack channel and bot token are both configured.
    #[must_use]
    pub fn notifications_enabled(&self) -> bool {
        !self.slack.channel_id.is_empty() && !self.slack.bot_token.is_empty()
    }

    /// Tick period for the assign-unassigned job.
    #[must_use]
    pub fn assign_period(&self) -> Duration {
        Duration::from_secs(self.jobs.assign_interval_seconds)
    }

    /// Tick period for the remind-unacknowledged job.
    #[must_use]
    pub fn remind_period(&self) -> Duration {
        Duration::from_secs(self.jobs.remind_interval_seconds)
    }

    fn validate(&self) -> Result<()> {
        if self.jobs.assign_interval_seconds == 0 {
            return Err(AppError::Config(
                "assign_interval_seconds must be greater than zero".into(),
            ));
        }
        if self.jobs.remind_interval_seconds == 0 {
            return Err(AppError::Config(
                "remind_interval_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
