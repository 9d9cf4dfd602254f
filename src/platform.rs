//! Audio subsystem integration
//!
//! The USB audio class driver reports card lifecycle through a bundle of
//! platform ops. [`AudioPlatform`] is the side that accepts the bundle;
//! [`PlatformOps`] is the bundle itself.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::device::DeviceContext;
use crate::error::EBUSY;
use crate::service::OffloadService;

/// Power-management event passed to the suspend hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PmMessage {
    /// System suspend
    Suspend,
    /// Runtime autosuspend
    AutoSuspend,
    /// Hibernation image freeze
    Freeze,
}

/// Error installing platform ops
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Another ops bundle is already installed
    Busy,
    /// The audio subsystem refused the bundle
    Rejected { code: i32 },
}

impl PlatformError {
    /// Negative status code
    pub fn errno(&self) -> i32 {
        match self {
            PlatformError::Busy => -EBUSY,
            PlatformError::Rejected { code } => -code.abs(),
        }
    }
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::Busy => write!(f, "Platform ops already registered"),
            PlatformError::Rejected { code } => write!(f, "Platform ops rejected ({})", code),
        }
    }
}

impl std::error::Error for PlatformError {}

/// Card lifecycle hooks called by the audio subsystem
///
/// The return values of the hooks are not consumed.
pub trait PlatformOps: Send + Sync {
    /// A card finished probing
    fn connect(&self, ctx: &Arc<DeviceContext>) -> impl Future<Output = ()> + Send;

    /// A card is going away
    fn disconnect(&self, ctx: &Arc<DeviceContext>) -> impl Future<Output = ()> + Send;

    /// A card's interface is being suspended
    fn suspend(&self, ctx: &Arc<DeviceContext>, message: PmMessage)
        -> impl Future<Output = ()> + Send;
}

/// Audio subsystem that accepts one platform ops bundle
pub trait AudioPlatform: Send + Sync {
    /// Install the ops bundle
    fn register_platform_ops(
        &self,
        ops: Arc<OffloadService>,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// Remove the installed bundle
    fn unregister_platform_ops(&self) -> impl Future<Output = ()> + Send;
}

/// In-process audio subsystem
///
/// Holds at most one ops bundle and forwards card events to it. Events
/// arriving with no bundle installed are ignored.
#[derive(Default)]
pub struct LocalPlatform {
    ops: RwLock<Option<Arc<OffloadService>>>,
}

impl LocalPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if an ops bundle is installed
    pub async fn has_ops(&self) -> bool {
        self.ops.read().await.is_some()
    }

    async fn current(&self) -> Option<Arc<OffloadService>> {
        self.ops.read().await.clone()
    }

    /// Report a newly attached card
    pub async fn notify_connect(&self, ctx: &Arc<DeviceContext>) {
        if let Some(ops) = self.current().await {
            ops.connect(ctx).await;
        }
    }

    /// Report a card removal
    ///
    /// Marks the card as shutting down before running the hook.
    pub async fn notify_disconnect(&self, ctx: &Arc<DeviceContext>) {
        ctx.mark_shutdown();
        if let Some(ops) = self.current().await {
            ops.disconnect(ctx).await;
        }
    }

    /// Report a suspend
    pub async fn notify_suspend(&self, ctx: &Arc<DeviceContext>, message: PmMessage) {
        if let Some(ops) = self.current().await {
            ops.suspend(ctx, message).await;
        }
    }
}

impl AudioPlatform for LocalPlatform {
    async fn register_platform_ops(&self, ops: Arc<OffloadService>) -> Result<(), PlatformError> {
        let mut slot = self.ops.write().await;

        if slot.is_some() {
            return Err(PlatformError::Busy);
        }

        *slot = Some(ops);
        Ok(())
    }

    async fn unregister_platform_ops(&self) {
        self.ops.write().await.take();
    }
}
