//! USB audio offload dispatch
//!
//! Tracks attached USB audio cards by card index and routes "offload this
//! stream" requests to a single registered handler, handing it the stream's
//! active data endpoint.
//!
//! # Overview
//!
//! ```text
//!   audio subsystem                         offload transport
//!   ───────────────                         ─────────────────
//!   connect/disconnect/suspend              register_offload_handler()
//!          │                                         │
//!          ▼                                         ▼
//!   ┌──────────────┐    lock(card)    ┌────────────────────────┐
//!   │DeviceRegistry│◄─────────────────│   OffloadController    │
//!   │ [slot; N]    │                  │ validate ─► lock ─►    │
//!   └──────────────┘                  │ resolve ─► endpoint ─► │
//!                                     │ invoke handler         │
//!                                     └────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use usb_audio_offload::device::EndpointRef;
//! use usb_audio_offload::{LocalPlatform, OffloadConfig, OffloadService, SharedHandler};
//!
//! # async fn example() -> usb_audio_offload::error::Result<()> {
//! let platform = LocalPlatform::new();
//! let service = OffloadService::init(&platform, OffloadConfig::default()).await?;
//!
//! let handler: SharedHandler = Arc::new(|target: &EndpointRef<'_>| {
//!     println!("offload ep {:#04x}", target.endpoint.address);
//! });
//! service.register_offload_handler(Some(handler)).await;
//!
//! // card 0, PCM device 0, playback
//! let status = service.apply_offload_configuration(0, 0, 0).await;
//! # let _ = status;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod controller;
pub mod device;
pub mod error;
pub mod handler;
mod lifecycle;
pub mod platform;
pub mod registry;
pub mod service;
pub mod stats;
pub mod transport;

pub use config::OffloadConfig;
pub use controller::{OffloadController, OffloadRequest};
pub use device::{DeviceContext, Direction, EndpointRef};
pub use error::{Error, Result};
pub use handler::{CallbackSlot, OffloadHandler, SharedHandler};
pub use platform::{AudioPlatform, LocalPlatform, PlatformError, PlatformOps, PmMessage};
pub use registry::{DeviceRegistry, MAX_CARDS};
pub use service::OffloadService;
pub use stats::OffloadStats;
pub use transport::{OffloadMode, TransportState};
