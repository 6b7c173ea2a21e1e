//! Error types for option resolution, client construction and tracing.
//!
//! [`ClientError`] is the central error type returned by builds and
//! reloads. Instrumentation failures ([`SpanError`]) never leave the hook
//! pipeline: they are logged and swallowed so data operations behave the
//! same with or without a working tracing backend.

use crate::hooks::{HookPhase, OperationCategory};

/// Malformed or contradictory connection options.
///
/// Always names the offending field so the operator can fix the source
/// configuration without guessing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid option `{field}`: {reason}")]
pub struct ConfigError {
    /// Name of the field (or environment variable) that failed validation.
    pub field: &'static str,
    /// Human-readable reason.
    pub reason: String,
}

impl ConfigError {
    /// Creates a new error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// The hook table could not be completed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookRegistrationError {
    /// A hook is already registered for this slot.
    #[error("{phase} hook for `{category}` is already registered")]
    Duplicate {
        /// Operation category of the slot.
        category: OperationCategory,
        /// Phase of the slot.
        phase: HookPhase,
    },

    /// No hook was registered for this slot.
    #[error("{phase} hook for `{category}` is missing")]
    Missing {
        /// Operation category of the slot.
        category: OperationCategory,
        /// Phase of the slot.
        phase: HookPhase,
    },
}

/// Failure reported by the tracing backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    /// The backend is not collecting spans (no subscriber, filtered out).
    #[error("span collection is disabled")]
    Disabled,

    /// The backend rejected the span.
    #[error("tracing backend error: {0}")]
    Backend(String),
}

/// Failure to build or rebuild a pooled client.
///
/// # Propagation
///
/// | Variant            | At startup | At reload                  |
/// |--------------------|------------|----------------------------|
/// | `Config`           | fatal      | logged, old client kept    |
/// | `Connection`       | fatal      | logged, old client kept    |
/// | `HookRegistration` | fatal      | logged, old client kept    |
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Options failed validation.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The pool handle could not be obtained.
    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    /// Instrumentation could not be fully installed.
    #[error("hook registration error: {0}")]
    HookRegistration(#[from] HookRegistrationError),
}

impl ClientError {
    /// Returns a short discriminator suitable for a structured log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Connection(_) => "connection",
            Self::HookRegistration(_) => "hook_registration",
        }
    }
}
