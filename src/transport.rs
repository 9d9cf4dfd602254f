//! Transport offload state
//!
//! The host controller driver owns the offload transport; this crate only
//! records the state it reports.

/// Operating mode of the offload transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffloadMode {
    /// Transport idle
    #[default]
    Stopped,
    /// Audio data is moved through DRAM by the offload engine
    DramActive,
}

/// Offload state reported by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportState {
    /// USB audio offload is supported on this platform
    pub usb_audio_offload: bool,
    /// The offload processor accesses the controller directly
    pub direct_usb_access: bool,
    /// An offload session is running
    pub offload_active: bool,
    /// Current operating mode
    pub mode: OffloadMode,
}

impl TransportState {
    /// Check if audio is currently routed through the offload engine
    pub fn is_streaming(&self) -> bool {
        self.offload_active && self.mode == OffloadMode::DramActive
    }
}
