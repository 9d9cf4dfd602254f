//! Offload service
//!
//! Ties the card registry, the handler slot and the request controller
//! together, and is the ops bundle handed to the audio subsystem.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::OffloadConfig;
use crate::controller::{OffloadController, OffloadRequest};
use crate::error::Result;
use crate::handler::{CallbackSlot, SharedHandler};
use crate::platform::AudioPlatform;
use crate::registry::DeviceRegistry;
use crate::stats::{OffloadStats, StatsCollector};
use crate::transport::{OffloadMode, TransportState};

/// USB audio offload service
pub struct OffloadService {
    config: OffloadConfig,
    pub(crate) registry: Arc<DeviceRegistry>,
    handlers: Arc<CallbackSlot>,
    controller: OffloadController,
    pub(crate) stats: Arc<StatsCollector>,
    transport: RwLock<TransportState>,
}

impl OffloadService {
    /// Create a service that is not yet attached to an audio subsystem
    pub fn new(config: OffloadConfig) -> Self {
        let registry = Arc::new(DeviceRegistry::with_config(config.registry.clone()));
        let handlers = Arc::new(CallbackSlot::new());
        let stats = Arc::new(StatsCollector::new());
        let controller = OffloadController::new(
            Arc::clone(&registry),
            Arc::clone(&handlers),
            Arc::clone(&stats),
        );
        let transport = RwLock::new(config.transport_state());

        Self {
            config,
            registry,
            handlers,
            controller,
            stats,
            transport,
        }
    }

    /// Create a service and install its lifecycle hooks
    ///
    /// Fails if the audio subsystem rejects the hooks.
    pub async fn init<P: AudioPlatform>(platform: &P, config: OffloadConfig) -> Result<Arc<Self>> {
        let service = Arc::new(Self::new(config));

        if let Err(e) = platform.register_platform_ops(Arc::clone(&service)).await {
            tracing::error!(error = %e, "Failed to register platform ops");
            return Err(e.into());
        }

        tracing::info!(
            max_cards = service.registry.capacity(),
            "Registered USB audio offload platform ops"
        );

        Ok(service)
    }

    /// Remove the lifecycle hooks from the audio subsystem
    pub async fn shutdown<P: AudioPlatform>(&self, platform: &P) {
        tracing::info!("Unregistering USB audio offload platform ops");
        platform.unregister_platform_ops().await;
    }

    /// Get the service configuration
    pub fn config(&self) -> &OffloadConfig {
        &self.config
    }

    /// Get the card registry
    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    /// Install the offload handler
    ///
    /// Returns false if `handler` is None.
    pub async fn register_offload_handler(&self, handler: Option<SharedHandler>) -> bool {
        tracing::info!("Registering USB offload handler");

        match self.handlers.register(handler).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Offload handler registration failed");
                false
            }
        }
    }

    /// Remove the offload handler
    pub async fn unregister_offload_handler(&self) {
        tracing::info!("Unregistering USB offload handler");
        self.handlers.unregister().await;
    }

    /// Check if an offload handler is installed
    pub async fn has_offload_handler(&self) -> bool {
        self.handlers.is_registered().await
    }

    /// Resolve a stream's data endpoint and hand it to the offload handler
    pub async fn apply(&self, request: OffloadRequest) -> Result<()> {
        self.controller.apply(request).await
    }

    /// Status-code form of [`apply`](Self::apply)
    ///
    /// Returns 0 on success, including when no handler is registered, and a
    /// negative errno otherwise.
    pub async fn apply_offload_configuration(&self, card: i32, device: i32, direction: i32) -> i32 {
        match self
            .apply(OffloadRequest::new(card, device, direction))
            .await
        {
            Ok(()) => 0,
            Err(e) => e.errno(),
        }
    }

    /// Current transport state
    pub async fn transport_state(&self) -> TransportState {
        *self.transport.read().await
    }

    /// Record the state reported by the transport
    pub async fn set_transport_state(&self, state: TransportState) {
        *self.transport.write().await = state;
    }

    /// Record a transport mode change
    pub async fn set_mode(&self, mode: OffloadMode) {
        let mut transport = self.transport.write().await;
        tracing::debug!(from = ?transport.mode, to = ?mode, "Offload mode changed");
        transport.mode = mode;
    }

    /// Snapshot of the service counters
    pub fn stats(&self) -> OffloadStats {
        self.stats.snapshot()
    }
}
