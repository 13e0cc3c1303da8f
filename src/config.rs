//! Environment-driven application configuration
//!
//! `.env` is loaded by the binary before `AppConfig::from_env` runs, so values
//! there behave exactly like exported variables.

use serde::Serialize;
use std::env;
use std::time::Duration;

/// ---------------------------------------------------------------------------
/// Defaults
/// ---------------------------------------------------------------------------

pub const DEFAULT_DB_URL: &str = "sqlite://workout-builder.db?mode=rwc";
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(&'static str),

  #[error("Invalid value for {key}: {value}")]
  Invalid { key: &'static str, value: String },
}

impl Serialize for ConfigError {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
  where
    S: serde::Serializer,
  {
    serializer.serialize_str(&self.to_string())
  }
}

/// ---------------------------------------------------------------------------
/// App Config
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub database_url: String,
  /// Hosted backend base URL; catalog commands need it, offline ones don't
  pub backend_url: Option<String>,
  pub backend_anon_key: Option<String>,
  pub cache_ttl: Duration,
  pub log_level: String,
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    let cache_ttl_secs = match non_empty_var("CATALOG_CACHE_TTL_SECS") {
      Some(raw) => raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
        key: "CATALOG_CACHE_TTL_SECS",
        value: raw,
      })?,
      None => DEFAULT_CACHE_TTL_SECS,
    };

    Ok(Self {
      database_url: non_empty_var("WORKOUT_BUILDER_DB_URL")
        .unwrap_or_else(|| DEFAULT_DB_URL.to_string()),
      backend_url: non_empty_var("BACKEND_URL"),
      backend_anon_key: non_empty_var("BACKEND_ANON_KEY"),
      cache_ttl: Duration::from_secs(cache_ttl_secs),
      log_level: non_empty_var("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
    })
  }

  pub fn require_backend_url(&self) -> Result<&str, ConfigError> {
    self
      .backend_url
      .as_deref()
      .ok_or(ConfigError::Missing("BACKEND_URL"))
  }

  pub fn require_anon_key(&self) -> Result<&str, ConfigError> {
    self
      .backend_anon_key
      .as_deref()
      .ok_or(ConfigError::Missing("BACKEND_ANON_KEY"))
  }
}

fn non_empty_var(key: &str) -> Option<String> {
  env::var(key).ok().filter(|v| !v.trim().is_empty())
}
