//! Simulated USB audio hotplug with offload dispatch
//!
//! Run with: cargo run --example hotplug
//!
//! Set `RUST_LOG=debug` for lock and dispatch details.

use std::sync::Arc;

use bytes::Bytes;
use usb_audio_offload::device::{AudioStream, DataEndpoint, DeviceContext, UsbDevice};
use usb_audio_offload::{
    Direction, EndpointRef, LocalPlatform, OffloadConfig, OffloadMode, OffloadService,
    SharedHandler,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "usb_audio_offload=info".into()),
        )
        .init();

    let platform = LocalPlatform::new();
    let service = OffloadService::init(&platform, OffloadConfig::default()).await?;

    let handler: SharedHandler = Arc::new(|target: &EndpointRef<'_>| {
        println!(
            "offload card {} pcm {} {}: ep {:#04x} maxp {} (dev {:04x}:{:04x})",
            target.card_index,
            target.device_index,
            target.direction,
            target.endpoint.address,
            target.endpoint.max_packet_size,
            target.device.vendor_id,
            target.device.product_id,
        );
    });

    // Before a handler exists the request is accepted and skipped
    let headset = Arc::new(DeviceContext::with_streams(
        1,
        UsbDevice::new(1, 3, 0x18d1, 0x5034),
        vec![AudioStream::new(0)
            .with_endpoint(
                Direction::Playback,
                DataEndpoint::new(1, Direction::Playback, 192)
                    .with_extra(Bytes::from_static(&[0x07, 0x25, 0x01, 0x00, 0x00, 0x00, 0x00])),
            )
            .with_endpoint(Direction::Capture, DataEndpoint::new(2, Direction::Capture, 96))],
    ));
    platform.notify_connect(&headset).await;
    println!("status without handler: {}", service.apply_offload_configuration(1, 0, 0).await);

    service.register_offload_handler(Some(handler)).await;
    service.set_mode(OffloadMode::DramActive).await;

    for direction in Direction::ALL {
        let status = service
            .apply_offload_configuration(1, 0, direction as i32)
            .await;
        println!("status for {}: {}", direction, status);
    }

    platform.notify_disconnect(&headset).await;
    println!("status after unplug: {}", service.apply_offload_configuration(1, 0, 0).await);

    service.set_mode(OffloadMode::Stopped).await;
    service.unregister_offload_handler().await;
    service.shutdown(&platform).await;

    println!("{:#?}", service.stats());
    Ok(())
}
