//! Error types for offload operations
//!
//! Every lookup failure is returned to the immediate caller. The only fatal
//! condition is failing to install the lifecycle hooks at startup.

use crate::device::Direction;
use crate::platform::PlatformError;
use crate::registry::RegistryError;

/// `EINVAL`
pub const EINVAL: i32 = 22;
/// `ENODEV`
pub const ENODEV: i32 = 19;
/// `EBUSY`
pub const EBUSY: i32 = 16;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for offload operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Out-of-range card index, negative device index or unknown direction
    InvalidArgument(String),
    /// No live device context is bound to the card index
    DeviceNotFound { card: u32 },
    /// The device has no stream matching the device index and direction
    StreamNotFound {
        card: u32,
        device: u32,
        direction: Direction,
    },
    /// The stream exists but has no active data endpoint
    EndpointUnavailable {
        card: u32,
        device: u32,
        direction: Direction,
    },
    /// Attempted to register an absent offload handler
    NullHandler,
    /// The lifecycle hooks could not be installed
    Registration(PlatformError),
}

impl Error {
    /// Negative status code reported through the configuration API
    pub fn errno(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) | Error::NullHandler => -EINVAL,
            Error::DeviceNotFound { .. }
            | Error::StreamNotFound { .. }
            | Error::EndpointUnavailable { .. } => -ENODEV,
            Error::Registration(e) => e.errno(),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::DeviceNotFound { card } => write!(f, "No device bound to card {}", card),
            Error::StreamNotFound {
                card,
                device,
                direction,
            } => write!(
                f,
                "No {} stream for card {} device {}",
                direction, card, device
            ),
            Error::EndpointUnavailable {
                card,
                device,
                direction,
            } => write!(
                f,
                "No active data endpoint for card {} device {} ({})",
                card, device, direction
            ),
            Error::NullHandler => write!(f, "Offload handler is missing"),
            Error::Registration(e) => write!(f, "Failed to install platform ops: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Registration(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Error::InvalidArgument(e.to_string())
    }
}

impl From<PlatformError> for Error {
    fn from(e: PlatformError) -> Self {
        Error::Registration(e)
    }
}
