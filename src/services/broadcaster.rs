//! Event fan-out to attached listeners.
//!
//! Serializes an outbound event once and enqueues it to every connection
//! registered at call start. Per-connection failure is logged and never
//! aborts delivery to the rest of the pass; connections that fail are
//! detached afterwards, outside the enumeration.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, error, warn};

use crate::models::OutboundEvent;
use crate::services::{ConnectionId, ConnectionRegistry};

pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Delivers `event` to every attached connection. Returns after an
    /// attempt has been made on each connection registered when the pass
    /// started; connections attaching concurrently may or may not receive
    /// it, an accepted best-effort race since a later event converges state.
    pub async fn publish(&self, event: &OutboundEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize outbound event");
                return;
            }
        };

        let mut failed: Vec<ConnectionId> = Vec::new();
        self.registry
            .for_each(|id, tx| match tx.try_send(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    warn!(connection = %id, "outbound queue full, dropping listener");
                    failed.push(id);
                }
                Err(TrySendError::Closed(_)) => {
                    debug!(connection = %id, "outbound queue closed");
                    failed.push(id);
                }
            })
            .await;

        for id in failed {
            self.registry.detach(id).await;
        }
    }

    /// Delivers `event` to a single connection, used to re-synchronize a
    /// listener whose view of the current track is stale.
    pub async fn send_to(&self, id: ConnectionId, event: &OutboundEvent) {
        let payload = match serde_json::to_string(event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize outbound event");
                return;
            }
        };

        let Some(tx) = self.registry.sender_of(id).await else {
            debug!(connection = %id, "target connection already gone");
            return;
        };

        if tx.try_send(payload).is_err() {
            warn!(connection = %id, "targeted send failed, dropping listener");
            self.registry.detach(id).await;
        }
    }
}
