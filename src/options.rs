//! Validated connection and pool options.
//!
//! [`Options`] is the only configuration the client builder consumes. It is
//! produced from [`RawOptions`] by [`Options::resolve`], which performs no
//! I/O, and is immutable afterwards: every reload resolves a fresh value.

use std::time::Duration;

use crate::config::RawOptions;
use crate::error::ConfigError;

/// Resolved database configuration for one build cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// PostgreSQL connection string.
    pub url: String,
    /// Log every statement in addition to tracing it.
    pub debug: bool,
    /// Cap on idle connections. Recorded and reported; the pool reaps idle
    /// connections through `max_idle_time` rather than enforcing a count.
    pub max_idle: u32,
    /// Upper bound on open connections (0 = unlimited).
    pub max_open: u32,
    /// Maximum time a connection may be reused ([`Duration::ZERO`] = unlimited).
    pub max_lifetime: Duration,
    /// Maximum time a connection may sit idle ([`Duration::ZERO`] = unlimited).
    pub max_idle_time: Duration,
    /// Time to wait for a connection from the pool.
    pub acquire_timeout: Duration,
}

impl Options {
    /// Validates raw settings.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first offending field:
    /// missing URL, non-PostgreSQL scheme, negative numbers, a zero
    /// acquire timeout, or `max_idle > max_open` while `max_open` is
    /// bounded.
    pub fn resolve(raw: &RawOptions) -> Result<Self, ConfigError> {
        let url = raw
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ConfigError::new("url", "is required"))?;
        if !(url.starts_with("postgres://") || url.starts_with("postgresql://")) {
            return Err(ConfigError::new(
                "url",
                "scheme must be `postgres` or `postgresql`",
            ));
        }

        let max_idle = non_negative_count("max_idle", raw.max_idle)?;
        let max_open = non_negative_count("max_open", raw.max_open)?;
        if max_open > 0 && max_idle > max_open {
            return Err(ConfigError::new(
                "max_idle",
                format!("{max_idle} exceeds max_open {max_open}"),
            ));
        }

        let acquire_timeout = non_negative_secs("acquire_timeout_secs", raw.acquire_timeout_secs)?;
        if acquire_timeout.is_zero() {
            return Err(ConfigError::new("acquire_timeout_secs", "must be positive"));
        }

        Ok(Self {
            url: url.to_string(),
            debug: raw.debug,
            max_idle,
            max_open,
            max_lifetime: non_negative_secs("max_lifetime_secs", raw.max_lifetime_secs)?,
            max_idle_time: non_negative_secs("max_idle_time_secs", raw.max_idle_time_secs)?,
            acquire_timeout,
        })
    }

    /// Returns the URL with any password replaced by `***`.
    #[must_use]
    pub fn redacted_url(&self) -> String {
        let Some((scheme, rest)) = self.url.split_once("://") else {
            return self.url.clone();
        };
        let Some((userinfo, host)) = rest.rsplit_once('@') else {
            return self.url.clone();
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => self.url.clone(),
        }
    }
}

fn non_negative_count(field: &'static str, value: i64) -> Result<u32, ConfigError> {
    if value < 0 {
        return Err(ConfigError::new(field, format!("{value} is negative")));
    }
    u32::try_from(value).map_err(|_| ConfigError::new(field, format!("{value} is too large")))
}

fn non_negative_secs(field: &'static str, value: i64) -> Result<Duration, ConfigError> {
    u64::try_from(value)
        .map(Duration::from_secs)
        .map_err(|_| ConfigError::new(field, format!("{value} is negative")))
}
