//! Service configuration

use crate::registry::RegistryConfig;
use crate::transport::{OffloadMode, TransportState};

/// Offload service configuration options
#[derive(Debug, Clone)]
pub struct OffloadConfig {
    /// Card registry settings
    pub registry: RegistryConfig,

    /// Transport mode at startup
    pub initial_mode: OffloadMode,

    /// Whether the platform supports USB audio offload
    pub usb_audio_offload: bool,

    /// Whether the offload processor accesses the controller directly
    pub direct_usb_access: bool,
}

impl Default for OffloadConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            initial_mode: OffloadMode::Stopped,
            usb_audio_offload: true,
            direct_usb_access: false,
        }
    }
}

impl OffloadConfig {
    /// Set the number of card slots
    pub fn max_cards(mut self, max_cards: usize) -> Self {
        self.registry = self.registry.max_cards(max_cards);
        self
    }

    /// Set the transport mode at startup
    pub fn initial_mode(mut self, mode: OffloadMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Enable or disable USB audio offload support
    pub fn usb_audio_offload(mut self, enabled: bool) -> Self {
        self.usb_audio_offload = enabled;
        self
    }

    /// Enable or disable direct controller access
    pub fn direct_usb_access(mut self, enabled: bool) -> Self {
        self.direct_usb_access = enabled;
        self
    }

    /// Transport state implied by this configuration
    pub(crate) fn transport_state(&self) -> TransportState {
        TransportState {
            usb_audio_offload: self.usb_audio_offload,
            direct_usb_access: self.direct_usb_access,
            offload_active: false,
            mode: self.initial_mode,
        }
    }
}
