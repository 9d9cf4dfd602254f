//! Stream and endpoint resolution
//!
//! Maps a (device index, direction) pair on a locked card to the substream
//! and its active data endpoint. Both lookups borrow from the locked
//! [`ContextState`], so results cannot outlive the card lock.

use super::context::{ContextState, DeviceContext};
use super::stream::{DataEndpoint, Direction, Substream, UsbDevice};

/// Resolved endpoint handed to the offload handler
///
/// Only valid for the duration of the handler call.
#[derive(Debug, Clone, Copy)]
pub struct EndpointRef<'a> {
    /// Card the endpoint belongs to
    pub card_index: u32,
    /// PCM device index
    pub device_index: u32,
    /// Substream direction
    pub direction: Direction,
    /// USB device owning the endpoint
    pub device: &'a UsbDevice,
    /// Active data endpoint
    pub endpoint: &'a DataEndpoint,
}

/// Find the substream for `device_index` and `direction`
///
/// Returns None if the card is shutting down or the index is beyond the
/// declared device count. Streams are scanned in insertion order and the
/// first matching index wins.
pub fn resolve<'a>(
    ctx: &DeviceContext,
    state: &'a ContextState,
    device_index: u32,
    direction: Direction,
) -> Option<&'a Substream> {
    if ctx.is_shutdown() {
        return None;
    }

    if device_index >= state.pcm_devs() {
        return None;
    }

    state
        .streams()
        .iter()
        .find(|stream| stream.pcm_index == device_index)
        .map(|stream| stream.substream(direction))
}

/// Get the active data endpoint of a substream
///
/// Returns None when the substream is not configured or the host has no
/// endpoint context for its pipe.
pub fn endpoint_of(substream: &Substream) -> Option<&DataEndpoint> {
    substream
        .data_endpoint
        .as_ref()
        .filter(|endpoint| endpoint.is_mapped())
}
