//! Raw database settings loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Values are read as-is into
//! [`RawOptions`]; range checks happen later in
//! [`Options::resolve`](crate::options::Options::resolve).

use serde::Deserialize;

use crate::error::ConfigError;

/// Default cap on idle connections.
pub const DEFAULT_MAX_IDLE: i64 = 2;

/// Default pool acquire timeout in seconds.
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: i64 = 5;

/// Unvalidated database settings.
///
/// Integers are signed so that negative input survives until validation
/// and can be reported against the right field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    /// PostgreSQL connection string.
    pub url: Option<String>,

    /// Log every statement in addition to tracing it.
    pub debug: bool,

    /// Cap on idle connections (best effort; see `max_idle_time_secs`).
    pub max_idle: i64,

    /// Upper bound on open connections (0 = unlimited).
    pub max_open: i64,

    /// Maximum seconds a connection may be reused (0 = unlimited).
    pub max_lifetime_secs: i64,

    /// Maximum seconds a connection may sit idle (0 = unlimited).
    pub max_idle_time_secs: i64,

    /// Seconds to wait for a connection from the pool.
    pub acquire_timeout_secs: i64,
}

impl Default for RawOptions {
    fn default() -> Self {
        Self {
            url: None,
            debug: false,
            max_idle: DEFAULT_MAX_IDLE,
            max_open: 0,
            max_lifetime_secs: 0,
            max_idle_time_secs: 0,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl RawOptions {
    /// Loads settings from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    /// Missing variables fall back to the defaults of
    /// [`RawOptions::default`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the variable if a value is set
    /// but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Re-reads the `.env` file, letting it override variables already in
    /// the process environment, then loads settings.
    ///
    /// Used on reload, where the file is the thing that changed.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the variable if a value is set
    /// but cannot be parsed.
    pub fn reload_from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv_override().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the key if a value is present but
    /// cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            debug: parse_bool(&lookup, "DATABASE_DEBUG", defaults.debug)?,
            max_idle: parse_var(&lookup, "DATABASE_MAX_IDLE", defaults.max_idle)?,
            max_open: parse_var(&lookup, "DATABASE_MAX_OPEN", defaults.max_open)?,
            max_lifetime_secs: parse_var(
                &lookup,
                "DATABASE_MAX_LIFETIME_SECS",
                defaults.max_lifetime_secs,
            )?,
            max_idle_time_secs: parse_var(
                &lookup,
                "DATABASE_MAX_IDLE_TIME_SECS",
                defaults.max_idle_time_secs,
            )?,
            acquire_timeout_secs: parse_var(
                &lookup,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                defaults.acquire_timeout_secs,
            )?,
        })
    }
}

/// Parses a variable as `T`, returning `default` when it is not set.
fn parse_var<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::new(key, format!("cannot parse `{raw}`"))),
    }
}

/// Parses a variable as a boolean. Accepts `"true"`, `"1"`, `"false"`,
/// `"0"` (case-insensitive).
fn parse_bool<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::new(key, format!("expected a boolean, got `{raw}`"))),
    }
}
