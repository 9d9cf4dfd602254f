//! PCM streams, substreams and data endpoints
//!
//! Each PCM device of a USB audio card is one [`AudioStream`] carrying a
//! playback and a capture [`Substream`]. A substream only has a
//! [`DataEndpoint`] once the audio subsystem has configured it.

use bytes::Bytes;

use crate::error::Error;

/// Transfer direction of a substream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Host to device
    Playback = 0,
    /// Device to host
    Capture = 1,
}

impl Direction {
    /// Both directions, in index order
    pub const ALL: [Direction; 2] = [Direction::Playback, Direction::Capture];

    /// Index into a stream's substream pair
    pub fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<i32> for Direction {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Playback),
            1 => Ok(Direction::Capture),
            other => Err(Error::InvalidArgument(format!(
                "Direction {} is neither playback nor capture",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Playback => write!(f, "playback"),
            Direction::Capture => write!(f, "capture"),
        }
    }
}

/// Identity of the USB device backing a card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbDevice {
    /// Bus number
    pub bus: u8,
    /// Device address on the bus
    pub address: u8,
    /// idVendor
    pub vendor_id: u16,
    /// idProduct
    pub product_id: u16,
}

impl UsbDevice {
    pub fn new(bus: u8, address: u8, vendor_id: u16, product_id: u16) -> Self {
        Self {
            bus,
            address,
            vendor_id,
            product_id,
        }
    }
}

/// Isochronous data endpoint used by a substream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataEndpoint {
    /// Endpoint number (0-15)
    pub ep_num: u8,

    /// bEndpointAddress, direction bit included
    pub address: u8,

    /// wMaxPacketSize
    pub max_packet_size: u16,

    /// Class-specific descriptors following the endpoint descriptor
    pub extra: Bytes,

    /// Whether the host controller has an endpoint context for this pipe
    mapped: bool,
}

impl DataEndpoint {
    /// Create a mapped endpoint
    pub fn new(ep_num: u8, direction: Direction, max_packet_size: u16) -> Self {
        let dir_bit = match direction {
            Direction::Playback => 0x00,
            Direction::Capture => 0x80,
        };

        Self {
            ep_num,
            address: dir_bit | (ep_num & 0x0f),
            max_packet_size,
            extra: Bytes::new(),
            mapped: true,
        }
    }

    /// Attach raw class-specific descriptor bytes
    pub fn with_extra(mut self, extra: Bytes) -> Self {
        self.extra = extra;
        self
    }

    /// Mark the endpoint as having no host-side context
    pub fn unmapped(mut self) -> Self {
        self.mapped = false;
        self
    }

    /// Check whether the host-side endpoint context exists
    pub fn is_mapped(&self) -> bool {
        self.mapped
    }

    /// Check if the endpoint transfers device-to-host
    pub fn is_in(&self) -> bool {
        self.address & 0x80 != 0
    }
}

/// One direction of a PCM stream
#[derive(Debug, Clone)]
pub struct Substream {
    /// Direction carried by this substream
    pub direction: Direction,

    /// Active data endpoint (None until configured)
    pub data_endpoint: Option<DataEndpoint>,
}

impl Substream {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            data_endpoint: None,
        }
    }
}

/// A PCM device exposed by a card
#[derive(Debug, Clone)]
pub struct AudioStream {
    /// PCM device index within the card
    pub pcm_index: u32,

    /// Playback and capture substreams, indexed by [`Direction::index`]
    pub substreams: [Substream; 2],
}

impl AudioStream {
    /// Create a stream with both substreams unconfigured
    pub fn new(pcm_index: u32) -> Self {
        Self {
            pcm_index,
            substreams: [
                Substream::new(Direction::Playback),
                Substream::new(Direction::Capture),
            ],
        }
    }

    /// Set the data endpoint for one direction
    pub fn with_endpoint(mut self, direction: Direction, endpoint: DataEndpoint) -> Self {
        self.substreams[direction.index()].data_endpoint = Some(endpoint);
        self
    }

    /// Get the substream for a direction
    pub fn substream(&self, direction: Direction) -> &Substream {
        &self.substreams[direction.index()]
    }

    /// Get the substream for a direction mutably
    pub fn substream_mut(&mut self, direction: Direction) -> &mut Substream {
        &mut self.substreams[direction.index()]
    }
}
