//! Serializable view of the published client.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::pooled::{PoolLimits, PooledClient};

/// Point-in-time status of a [`PooledClient`], for health reporting.
///
/// The URL is redacted; no credentials leave through this type.
#[derive(Debug, Clone, Serialize)]
pub struct ClientStatus {
    /// Build generation (1 = initial build).
    pub generation: u64,
    /// When the client was built.
    pub built_at: DateTime<Utc>,
    /// Connection URL with the password masked.
    pub url: String,
    /// Whether statements are logged.
    pub debug: bool,
    /// Limits applied to the pool.
    pub limits: PoolLimits,
    /// Connections currently open.
    pub open_connections: u32,
    /// Open connections currently idle.
    pub idle_connections: usize,
}

impl From<&PooledClient> for ClientStatus {
    fn from(client: &PooledClient) -> Self {
        Self {
            generation: client.generation(),
            built_at: client.built_at(),
            url: client.options().redacted_url(),
            debug: client.debug(),
            limits: client.limits(),
            open_connections: client.size(),
            idle_connections: client.num_idle(),
        }
    }
}
