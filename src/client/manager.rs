//! Client manager: initial build and hot reload.
//!
//! Lifecycle: no manager exists until [`ClientManager::initialize`]
//! succeeds; from then on it is always ready, and every successful
//! [`ClientManager::on_change`] publishes a new generation. A failed
//! reload leaves the previous client serving traffic.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use super::change_bus::ChangeEvent;
use super::handle::ClientHandle;
use super::pooled::PooledClient;
use crate::error::ClientError;
use crate::options::Options;
use crate::span::SpanCapability;

/// Owns the published [`ClientHandle`] and rebuilds it on change.
#[derive(Debug)]
pub struct ClientManager {
    handle: ClientHandle,
    spans: Arc<dyn SpanCapability>,
    reload: Mutex<()>,
}

impl ClientManager {
    /// Builds the first client, checks the server answers, and publishes it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the build fails or the server cannot be
    /// reached; startup should abort.
    pub async fn initialize(
        options: Options,
        spans: Arc<dyn SpanCapability>,
    ) -> Result<Self, ClientError> {
        let client = PooledClient::build(options, &spans, 1).await?;
        tracing::info!(
            generation = client.generation(),
            url = %client.options().redacted_url(),
            "initialize database success"
        );
        Ok(Self {
            handle: ClientHandle::new(client),
            spans,
            reload: Mutex::new(()),
        })
    }

    /// Returns a handle to the published client.
    ///
    /// Handles stay valid across reloads.
    #[must_use]
    pub fn handle(&self) -> ClientHandle {
        self.handle.clone()
    }

    /// Rebuilds the client from the event's settings and publishes it.
    ///
    /// Reloads are serialized. Operations running against the previous
    /// client are not interrupted; its pool is released once they finish.
    /// Returns the new generation.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the settings are invalid, the build
    /// fails, or the new server cannot be reached. The error is also
    /// logged, and the previous client stays published.
    pub async fn on_change(&self, event: &ChangeEvent) -> Result<u64, ClientError> {
        let _serial = self.reload.lock().await;
        match self.rebuild(event).await {
            Ok(generation) => {
                tracing::info!(generation, reason = %event.reason, "refresh database success");
                Ok(generation)
            }
            Err(err) => {
                tracing::error!(
                    error = %err,
                    kind = err.kind(),
                    reason = %event.reason,
                    generation = self.handle.generation(),
                    "refresh database error"
                );
                Err(err)
            }
        }
    }

    async fn rebuild(&self, event: &ChangeEvent) -> Result<u64, ClientError> {
        let options = Options::resolve(&event.options)?;
        let generation = self.handle.generation().saturating_add(1);
        let client = PooledClient::build(options, &self.spans, generation).await?;
        let previous = self.handle.swap(client);
        tracing::debug!(
            previous = previous.generation(),
            in_use = Arc::strong_count(&previous).saturating_sub(1),
            "previous client retired"
        );
        Ok(generation)
    }

    /// Applies every event from `events` in a background task.
    ///
    /// Lagged events are skipped, since only the newest settings matter.
    /// The task ends when the bus is dropped.
    pub fn spawn_watch(self: Arc<Self>, mut events: broadcast::Receiver<ChangeEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        // Failures are logged by on_change.
                        let _ = self.on_change(&event).await;
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "change watcher lagged behind bus");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            tracing::debug!("change watcher stopped");
        })
    }
}
