//! Shared, swappable handle to the current pooled client.

use std::sync::Arc;

use parking_lot::RwLock;
use sqlx::postgres::{PgArguments, PgQueryResult, PgRow};

use super::pooled::{PoolLimits, PooledClient};
use super::status::ClientStatus;
use crate::span::RequestContext;

/// Cloneable handle to whichever [`PooledClient`] is currently published.
///
/// Every clone points at the same slot. A reload swaps the `Arc` inside the
/// slot, so holders of the handle see the new client on their next call
/// without re-fetching anything.
///
/// # Concurrency
///
/// - Reads take the lock only long enough to clone an `Arc`.
/// - A reader always gets a complete client, old or new, never a mix.
/// - Operations already running keep their snapshot, and its pool,
///   alive until they finish.
#[derive(Debug, Clone)]
pub struct ClientHandle {
    slot: Arc<RwLock<Arc<PooledClient>>>,
}

impl ClientHandle {
    pub(crate) fn new(client: PooledClient) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Arc::new(client))),
        }
    }

    /// Returns a snapshot of the current client.
    #[must_use]
    pub fn current(&self) -> Arc<PooledClient> {
        Arc::clone(&self.slot.read())
    }

    /// Publishes `client` and returns the one it replaced.
    pub(crate) fn swap(&self, client: PooledClient) -> Arc<PooledClient> {
        let next = Arc::new(client);
        std::mem::replace(&mut *self.slot.write(), next)
    }

    /// Generation of the current client.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.current().generation()
    }

    /// Limits applied to the current pool.
    #[must_use]
    pub fn limits(&self) -> PoolLimits {
        self.current().limits()
    }

    /// Status snapshot of the current client.
    #[must_use]
    pub fn status(&self) -> ClientStatus {
        ClientStatus::from(self.current().as_ref())
    }

    /// See [`PooledClient::create`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn create(
        &self,
        request: &RequestContext,
        sql: &str,
        args: PgArguments,
    ) -> Result<PgQueryResult, sqlx::Error> {
        self.current().create(request, sql, args).await
    }

    /// See [`PooledClient::query`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn query(
        &self,
        request: &RequestContext,
        sql: &str,
        args: PgArguments,
    ) -> Result<Vec<PgRow>, sqlx::Error> {
        self.current().query(request, sql, args).await
    }

    /// See [`PooledClient::query_optional`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn query_optional(
        &self,
        request: &RequestContext,
        sql: &str,
        args: PgArguments,
    ) -> Result<Option<PgRow>, sqlx::Error> {
        self.current().query_optional(request, sql, args).await
    }

    /// See [`PooledClient::update`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn update(
        &self,
        request: &RequestContext,
        sql: &str,
        args: PgArguments,
    ) -> Result<PgQueryResult, sqlx::Error> {
        self.current().update(request, sql, args).await
    }

    /// See [`PooledClient::delete`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn delete(
        &self,
        request: &RequestContext,
        sql: &str,
        args: PgArguments,
    ) -> Result<PgQueryResult, sqlx::Error> {
        self.current().delete(request, sql, args).await
    }

    /// See [`PooledClient::raw`].
    ///
    /// # Errors
    ///
    /// Returns the driver's error.
    pub async fn raw(&self, request: &RequestContext, sql: &str) -> Result<PgQueryResult, sqlx::Error> {
        self.current().raw(request, sql).await
    }
}
