//! Device context
//!
//! A [`DeviceContext`] is the audio subsystem's view of one attached USB
//! audio card. Its stream list sits behind an async mutex; that mutex is the
//! per-card lock every registry mutation and offload request serializes on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use super::stream::{AudioStream, DataEndpoint, Direction, UsbDevice};

/// Lock-protected part of a device context
#[derive(Debug, Default)]
pub struct ContextState {
    /// Number of PCM devices the card declares
    pcm_devs: u32,

    /// Streams in the order the audio subsystem added them
    streams: Vec<AudioStream>,
}

impl ContextState {
    /// Declared PCM device count
    pub fn pcm_devs(&self) -> u32 {
        self.pcm_devs
    }

    /// Streams in insertion order
    pub fn streams(&self) -> &[AudioStream] {
        &self.streams
    }

    fn push(&mut self, stream: AudioStream) {
        self.pcm_devs = self.pcm_devs.max(stream.pcm_index.saturating_add(1));
        self.streams.push(stream);
    }
}

/// One attached USB audio card
#[derive(Debug)]
pub struct DeviceContext {
    card_index: u32,
    usb_device: UsbDevice,
    shutdown: AtomicBool,
    state: Arc<Mutex<ContextState>>,
}

impl DeviceContext {
    /// Create a context for a card with no streams yet
    pub fn new(card_index: u32, usb_device: UsbDevice) -> Self {
        Self::with_streams(card_index, usb_device, Vec::new())
    }

    /// Create a context with an initial stream list
    ///
    /// The declared PCM device count covers every stream's index.
    pub fn with_streams(card_index: u32, usb_device: UsbDevice, streams: Vec<AudioStream>) -> Self {
        let mut state = ContextState::default();
        for stream in streams {
            state.push(stream);
        }

        Self {
            card_index,
            usb_device,
            shutdown: AtomicBool::new(false),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Sound card number assigned by the audio subsystem
    pub fn card_index(&self) -> u32 {
        self.card_index
    }

    /// USB device backing this card
    pub fn usb_device(&self) -> &UsbDevice {
        &self.usb_device
    }

    /// Check if the card is being torn down
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Flag the card as going away
    ///
    /// Set by the audio subsystem before the disconnect hook runs.
    pub fn mark_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Acquire the card lock
    pub async fn lock(&self) -> OwnedMutexGuard<ContextState> {
        Arc::clone(&self.state).lock_owned().await
    }

    /// Try to acquire the card lock without waiting
    pub fn try_lock(&self) -> Option<OwnedMutexGuard<ContextState>> {
        Arc::clone(&self.state).try_lock_owned().ok()
    }

    /// Append a PCM stream
    pub async fn add_stream(&self, stream: AudioStream) {
        self.lock().await.push(stream);
    }

    /// Replace the data endpoint of one substream
    ///
    /// Returns false if no stream has `pcm_index`.
    pub async fn set_data_endpoint(
        &self,
        pcm_index: u32,
        direction: Direction,
        endpoint: Option<DataEndpoint>,
    ) -> bool {
        let mut state = self.lock().await;

        match state.streams.iter_mut().find(|s| s.pcm_index == pcm_index) {
            Some(stream) => {
                stream.substream_mut(direction).data_endpoint = endpoint;
                true
            }
            None => false,
        }
    }

    /// Drop the data endpoint of one substream
    ///
    /// Returns false if no stream has `pcm_index`.
    pub async fn clear_data_endpoint(&self, pcm_index: u32, direction: Direction) -> bool {
        self.set_data_endpoint(pcm_index, direction, None).await
    }
}
