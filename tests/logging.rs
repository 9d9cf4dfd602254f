//! Log output of dropped lifecycle events

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use usb_audio_offload::device::{DeviceContext, UsbDevice};
use usb_audio_offload::{LocalPlatform, OffloadConfig, OffloadService};

/// Counts warn-level events
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn test_out_of_range_card_logs_warning() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
    let _guard = tracing::subscriber::set_default(subscriber);

    let platform = LocalPlatform::new();
    let service = OffloadService::init(&platform, OffloadConfig::default().max_cards(2))
        .await
        .unwrap();

    let ctx = Arc::new(DeviceContext::new(7, UsbDevice::new(1, 9, 0x0bda, 0x4014)));
    platform.notify_connect(&ctx).await;
    assert_eq!(warnings.load(Ordering::SeqCst), 1);

    platform.notify_disconnect(&ctx).await;
    assert_eq!(warnings.load(Ordering::SeqCst), 2);

    assert!(service.registry().is_empty().await);
    assert_eq!(service.stats().dropped_events, 2);
}
