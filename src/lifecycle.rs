//! Card lifecycle hooks
//!
//! Connect binds a card's context in the registry and disconnect clears it.
//! Events for a card index the registry has no slot for are dropped with a
//! warning and counted.

use std::sync::Arc;

use crate::device::DeviceContext;
use crate::platform::{PlatformOps, PmMessage};
use crate::service::OffloadService;

impl PlatformOps for OffloadService {
    async fn connect(&self, ctx: &Arc<DeviceContext>) {
        let card = ctx.card_index();

        match self.registry.register(card, Arc::clone(ctx)).await {
            Ok(()) => {
                self.stats.record_connect();
                tracing::info!(card = card, "USB audio card connected");
            }
            Err(e) => {
                self.stats.record_dropped_event();
                tracing::warn!(card = card, error = %e, "Ignoring connect");
            }
        }
    }

    async fn disconnect(&self, ctx: &Arc<DeviceContext>) {
        let card = ctx.card_index();

        match self.registry.unregister(card).await {
            Ok(()) => {
                self.stats.record_disconnect();
                tracing::info!(card = card, "USB audio card disconnected");
            }
            Err(e) => {
                self.stats.record_dropped_event();
                tracing::warn!(card = card, error = %e, "Ignoring disconnect");
            }
        }
    }

    async fn suspend(&self, ctx: &Arc<DeviceContext>, message: PmMessage) {
        self.stats.record_suspend();
        tracing::debug!(card = ctx.card_index(), message = ?message, "USB audio card suspend");
    }
}
