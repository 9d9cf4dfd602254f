//! Device model
//!
//! This module provides:
//! - Per-card device contexts with their lock
//! - PCM streams, substreams and data endpoints
//! - Stream and endpoint resolution for offload requests

pub mod context;
pub mod resolver;
pub mod stream;

pub use context::{ContextState, DeviceContext};
pub use resolver::EndpointRef;
pub use stream::{AudioStream, DataEndpoint, Direction, Substream, UsbDevice};
