//! Server configuration, deserialised from `portal.toml` and `PORTAL_*`
//! environment variables.

use std::path::PathBuf;

use chrono::TimeDelta;
use chrono_tz::Tz;
use portal_core::temporal::DEFAULT_GRACE_MINUTES;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("unknown timezone: {0}")]
  UnknownTimezone(String),

  #[error("grace window must not be negative, got {0} minutes")]
  NegativeGraceWindow(i64),
}

/// Runtime server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                 String,
  #[serde(default = "default_port")]
  pub port:                 u16,
  #[serde(default = "default_store_path")]
  pub store_path:           PathBuf,
  /// IANA name of the viewers' wall clock.
  #[serde(default = "default_timezone")]
  pub timezone:             String,
  #[serde(default = "default_grace_window_minutes")]
  pub grace_window_minutes: i64,
  /// User identifiers granted platform-admin rights at startup.
  #[serde(default)]
  pub admins:               Vec<String>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("portal.sqlite") }

fn default_timezone() -> String { "Europe/Prague".to_owned() }

fn default_grace_window_minutes() -> i64 { DEFAULT_GRACE_MINUTES }

impl ServerConfig {
  /// Validate the parts of the configuration the handlers use.
  pub fn portal_settings(&self) -> Result<PortalSettings, ConfigError> {
    let timezone = self
      .timezone
      .trim()
      .parse::<Tz>()
      .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))?;

    if self.grace_window_minutes < 0 {
      return Err(ConfigError::NegativeGraceWindow(self.grace_window_minutes));
    }

    Ok(PortalSettings {
      timezone,
      grace_window: TimeDelta::minutes(self.grace_window_minutes),
    })
  }
}

/// Calendar settings shared by every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortalSettings {
  /// Day grouping and zone-less form input use this wall clock.
  pub timezone:     Tz,
  pub grace_window: TimeDelta,
}
