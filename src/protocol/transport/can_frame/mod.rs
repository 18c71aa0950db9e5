//! In-memory representation of a classic CAN frame, convertible from and to
//! any `embedded_can::Frame` so HAL drivers can be plugged in directly.
use crate::protocol::transport::can_id::{CanId, EXTENDED_MASK, STANDARD_MASK};
use embedded_can::{ExtendedId, Id, StandardId};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw CAN frame as exchanged with the controller.
pub struct CanFrame {
    /// Identifier, 11 or 29 bits depending on `extended`.
    pub id: CanId,
    /// Extended (29-bit) frame format.
    pub extended: bool,
    /// Remote transmission request.
    pub rtr: bool,
    /// Payload buffer. Classic CAN frames always provide eight bytes.
    pub data: [u8; 8],
    /// Number of valid payload bytes (Data Length Code, 0 to 8).
    pub len: usize,
}

impl CanFrame {
    /// Data frame carrying `payload` (truncated to eight bytes).
    pub fn new(id: CanId, extended: bool, payload: &[u8]) -> Self {
        let len = payload.len().min(8);
        let mut data = [0u8; 8];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            extended,
            rtr: false,
            data,
            len,
        }
    }

    /// Eight-byte frame: `payload` first, `filler` in every remaining byte.
    pub fn padded(id: CanId, extended: bool, payload: &[u8], filler: u8) -> Self {
        let mut data = [filler; 8];
        let len = payload.len().min(8);
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            extended,
            rtr: false,
            data,
            len: 8,
        }
    }

    /// Valid payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Copy a frame received through an `embedded_can` driver.
    pub fn from_frame<F: embedded_can::Frame>(frame: &F) -> Self {
        let (id, extended) = match frame.id() {
            Id::Standard(id) => (CanId(id.as_raw() as u32), false),
            Id::Extended(id) => (CanId(id.as_raw()), true),
        };
        let mut converted = Self::new(id, extended, frame.data());
        converted.rtr = frame.is_remote_frame();
        if converted.rtr {
            converted.len = frame.dlc().min(8);
        }
        converted
    }

    /// Build the driver frame type. `None` when the driver refuses the frame.
    pub fn to_frame<F: embedded_can::Frame>(&self) -> Option<F> {
        let id = if self.extended {
            Id::Extended(ExtendedId::new(self.id.0 & EXTENDED_MASK)?)
        } else {
            Id::Standard(StandardId::new((self.id.0 & STANDARD_MASK) as u16)?)
        };
        if self.rtr {
            F::new_remote(id, self.len)
        } else {
            F::new(id, self.payload())
        }
    }
}
