//! Offload configuration requests
//!
//! Applying a request locks the target card for the whole
//! lookup, resolve and invoke sequence, so a disconnect on the same card
//! waits until the handler has returned.

use std::sync::Arc;

use crate::device::{resolver, Direction, EndpointRef};
use crate::error::{Error, Result};
use crate::handler::CallbackSlot;
use crate::registry::DeviceRegistry;
use crate::stats::StatsCollector;

/// Request to route a card's stream through the offload path
///
/// Fields are raw values as received from the audio DSP side and are
/// validated when the request is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffloadRequest {
    /// Sound card number
    pub card: i32,
    /// PCM device index
    pub device: i32,
    /// 0 for playback, 1 for capture
    pub direction: i32,
}

impl OffloadRequest {
    pub fn new(card: i32, device: i32, direction: i32) -> Self {
        Self {
            card,
            device,
            direction,
        }
    }

    /// Build a request from typed values
    pub fn for_stream(card: u32, device: u32, direction: Direction) -> Self {
        Self {
            card: i32::try_from(card).unwrap_or(i32::MAX),
            device: i32::try_from(device).unwrap_or(i32::MAX),
            direction: direction as i32,
        }
    }
}

/// Resolves offload requests and dispatches them to the handler
pub struct OffloadController {
    registry: Arc<DeviceRegistry>,
    handlers: Arc<CallbackSlot>,
    stats: Arc<StatsCollector>,
}

impl OffloadController {
    pub fn new(
        registry: Arc<DeviceRegistry>,
        handlers: Arc<CallbackSlot>,
        stats: Arc<StatsCollector>,
    ) -> Self {
        Self {
            registry,
            handlers,
            stats,
        }
    }

    /// Apply an offload request
    ///
    /// Succeeds without effect when no handler is registered.
    pub async fn apply(&self, request: OffloadRequest) -> Result<()> {
        self.stats.record_request();

        tracing::info!(
            card = request.card,
            device = request.device,
            direction = request.direction,
            "Applying offload configuration"
        );

        match self.dispatch(request).await {
            Ok(invoked) => {
                self.stats.record_applied(invoked);
                Ok(())
            }
            Err(e) => {
                self.stats.record_failed();
                tracing::warn!(
                    card = request.card,
                    device = request.device,
                    direction = request.direction,
                    error = %e,
                    "Offload configuration failed"
                );
                Err(e)
            }
        }
    }

    fn validate(&self, request: &OffloadRequest) -> Result<(u32, u32, Direction)> {
        let max_cards = self.registry.capacity();

        let card = u32::try_from(request.card)
            .ok()
            .filter(|&card| (card as usize) < max_cards)
            .ok_or_else(|| {
                Error::InvalidArgument(format!(
                    "Card {} out of range (max {})",
                    request.card, max_cards
                ))
            })?;

        let device = u32::try_from(request.device).map_err(|_| {
            Error::InvalidArgument(format!("Device {} is negative", request.device))
        })?;

        let direction = Direction::try_from(request.direction)?;

        Ok((card, device, direction))
    }

    /// Returns whether the handler was called
    async fn dispatch(&self, request: OffloadRequest) -> Result<bool> {
        let (card, device, direction) = self.validate(&request)?;

        // Released on every return path below
        let guard = self
            .registry
            .lock(card)
            .await
            .ok_or(Error::DeviceNotFound { card })?;

        if guard.context().is_shutdown() {
            return Err(Error::DeviceNotFound { card });
        }

        let substream = guard.resolve(device, direction).ok_or(Error::StreamNotFound {
            card,
            device,
            direction,
        })?;

        let endpoint = resolver::endpoint_of(substream).ok_or(Error::EndpointUnavailable {
            card,
            device,
            direction,
        })?;

        let target = EndpointRef {
            card_index: card,
            device_index: device,
            direction,
            device: guard.context().usb_device(),
            endpoint,
        };

        let invoked = self.handlers.invoke_if_present(&target).await;
        if invoked {
            tracing::debug!(
                card = card,
                device = device,
                direction = %direction,
                ep = endpoint.ep_num,
                "Endpoint handed to offload handler"
            );
        } else {
            tracing::info!(
                card = card,
                device = device,
                "No offload handler registered, skipping"
            );
        }

        Ok(invoked)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::device::{AudioStream, DataEndpoint, DeviceContext, UsbDevice};
    use crate::handler::{OffloadHandler, SharedHandler};
    use crate::registry::RegistryConfig;

    #[derive(Default)]
    struct Recorder {
        calls: AtomicU32,
        last: Mutex<Option<(u32, u32, Direction, u8)>>,
    }

    impl OffloadHandler for Recorder {
        fn on_endpoint(&self, target: &EndpointRef<'_>) {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((
                target.card_index,
                target.device_index,
                target.direction,
                target.endpoint.address,
            ));
        }
    }

    struct Fixture {
        registry: Arc<DeviceRegistry>,
        handlers: Arc<CallbackSlot>,
        stats: Arc<StatsCollector>,
        controller: OffloadController,
    }

    fn fixture() -> Fixture {
        let registry = Arc::new(DeviceRegistry::with_config(
            RegistryConfig::default().max_cards(2),
        ));
        let handlers = Arc::new(CallbackSlot::new());
        let stats = Arc::new(StatsCollector::new());
        let controller =
            OffloadController::new(registry.clone(), handlers.clone(), stats.clone());

        Fixture {
            registry,
            handlers,
            stats,
            controller,
        }
    }

    fn card(index: u32) -> Arc<DeviceContext> {
        Arc::new(DeviceContext::with_streams(
            index,
            UsbDevice::new(1, 3, 0x0d8c, 0x0102),
            vec![
                AudioStream::new(0)
                    .with_endpoint(Direction::Playback, DataEndpoint::new(1, Direction::Playback, 192))
                    .with_endpoint(Direction::Capture, DataEndpoint::new(2, Direction::Capture, 96)),
                AudioStream::new(1),
            ],
        ))
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let f = fixture();

        for request in [
            OffloadRequest::new(2, 0, 0),
            OffloadRequest::new(-1, 0, 0),
            OffloadRequest::new(0, -1, 0),
            OffloadRequest::new(0, 0, 2),
            OffloadRequest::new(0, 0, -1),
        ] {
            let result = f.controller.apply(request).await;
            assert!(
                matches!(result, Err(Error::InvalidArgument(_))),
                "{:?} -> {:?}",
                request,
                result
            );
        }

        assert_eq!(f.stats.snapshot().failed, 5);
    }

    #[tokio::test]
    async fn test_device_not_found() {
        let f = fixture();

        let result = f.controller.apply(OffloadRequest::new(1, 0, 0)).await;
        assert_eq!(result, Err(Error::DeviceNotFound { card: 1 }));
    }

    #[tokio::test]
    async fn test_shutdown_card_not_found() {
        let f = fixture();
        let ctx = card(0);
        f.registry.register(0, ctx.clone()).await.unwrap();
        ctx.mark_shutdown();

        let result = f.controller.apply(OffloadRequest::new(0, 0, 0)).await;
        assert_eq!(result, Err(Error::DeviceNotFound { card: 0 }));
    }

    #[tokio::test]
    async fn test_stream_not_found() {
        let f = fixture();
        f.registry.register(0, card(0)).await.unwrap();

        let result = f.controller.apply(OffloadRequest::new(0, 5, 0)).await;
        assert_eq!(
            result,
            Err(Error::StreamNotFound {
                card: 0,
                device: 5,
                direction: Direction::Playback
            })
        );
    }

    #[tokio::test]
    async fn test_endpoint_unavailable() {
        let f = fixture();
        f.registry.register(0, card(0)).await.unwrap();

        let result = f.controller.apply(OffloadRequest::new(0, 1, 1)).await;
        assert_eq!(
            result,
            Err(Error::EndpointUnavailable {
                card: 0,
                device: 1,
                direction: Direction::Capture
            })
        );
    }

    #[tokio::test]
    async fn test_no_handler_is_success() {
        let f = fixture();
        f.registry.register(0, card(0)).await.unwrap();

        f.controller.apply(OffloadRequest::new(0, 0, 0)).await.unwrap();

        let stats = f.stats.snapshot();
        assert_eq!(stats.applied, 1);
        assert_eq!(stats.handler_invocations, 0);
        assert_eq!(stats.skipped_no_handler, 1);
    }

    #[tokio::test]
    async fn test_handler_receives_endpoint() {
        let f = fixture();
        f.registry.register(0, card(0)).await.unwrap();
        let recorder = Arc::new(Recorder::default());
        f.handlers
            .register(Some(recorder.clone() as SharedHandler))
            .await
            .unwrap();

        f.controller
            .apply(OffloadRequest::for_stream(0, 0, Direction::Capture))
            .await
            .unwrap();

        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            *recorder.last.lock().unwrap(),
            Some((0, 0, Direction::Capture, 0x82))
        );
        assert_eq!(f.stats.snapshot().handler_invocations, 1);
    }

    #[tokio::test]
    async fn test_card_locked_during_handler() {
        let f = fixture();
        let ctx = card(0);
        f.registry.register(0, ctx.clone()).await.unwrap();

        let watched = Arc::clone(&ctx);
        let locked = Arc::new(AtomicU32::new(0));
        let locked_in = Arc::clone(&locked);
        let handler: SharedHandler = Arc::new(move |_target: &EndpointRef<'_>| {
            // The card lock is held by the controller for the handler call
            let state = watched.try_lock();
            locked_in.store(u32::from(state.is_none()), Ordering::SeqCst);
        });
        f.handlers.register(Some(handler)).await.unwrap();

        f.controller.apply(OffloadRequest::new(0, 0, 0)).await.unwrap();
        assert_eq!(locked.load(Ordering::SeqCst), 1);

        // Released afterwards
        assert!(ctx.try_lock().is_some());
    }
}
