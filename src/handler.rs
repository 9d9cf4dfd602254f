//! Offload handler registration
//!
//! At most one offload handler is registered at a time. The handler is
//! stored as an `Arc`, so an invocation always runs against a complete
//! handler even if another task unregisters or replaces it mid-call.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::device::EndpointRef;
use crate::error::{Error, Result};

/// Consumer of resolved data endpoints
///
/// Called synchronously while the card lock is held, so implementations
/// must not block.
pub trait OffloadHandler: Send + Sync {
    /// Hand a resolved endpoint to the transport
    fn on_endpoint(&self, target: &EndpointRef<'_>);
}

impl<F> OffloadHandler for F
where
    F: Fn(&EndpointRef<'_>) + Send + Sync,
{
    fn on_endpoint(&self, target: &EndpointRef<'_>) {
        self(target)
    }
}

/// Shared handler reference
pub type SharedHandler = Arc<dyn OffloadHandler>;

/// Single-slot holder for the offload handler
#[derive(Default)]
pub struct CallbackSlot {
    handler: RwLock<Option<SharedHandler>>,
}

impl CallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handler, replacing any previous one
    pub async fn register(&self, handler: Option<SharedHandler>) -> Result<()> {
        let handler = handler.ok_or(Error::NullHandler)?;

        let previous = self.handler.write().await.replace(handler);
        if previous.is_some() {
            tracing::debug!("Replacing registered offload handler");
        }

        Ok(())
    }

    /// Remove the handler
    pub async fn unregister(&self) {
        self.handler.write().await.take();
    }

    /// Check if a handler is installed
    pub async fn is_registered(&self) -> bool {
        self.handler.read().await.is_some()
    }

    /// Call the handler with `target` if one is installed
    ///
    /// Returns whether the handler was called.
    pub async fn invoke_if_present(&self, target: &EndpointRef<'_>) -> bool {
        // Clone out so the slot is free while the handler runs
        let handler = self.handler.read().await.clone();

        match handler {
            Some(handler) => {
                handler.on_endpoint(target);
                true
            }
            None => false,
        }
    }
}
