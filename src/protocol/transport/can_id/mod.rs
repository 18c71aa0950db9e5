//! CAN identifiers used by ISO 15765-4: 11-bit identifiers for the standard
//! frame format and 29-bit normal-fixed addressing (`18DA<target><source>`)
//! for the extended format.

/// Mask of an 11-bit standard identifier.
pub const STANDARD_MASK: u32 = 0x7FF;
/// Mask of a 29-bit extended identifier.
pub const EXTENDED_MASK: u32 = 0x1FFF_FFFF;

/// Tester address used by OBD scan tools in 29-bit physical addressing.
pub const TESTER_ADDRESS: u8 = 0xF1;

/// Base of a 29-bit physical request (`18DA<ecu>F1`).
const PHYSICAL_REQUEST_BASE: u32 = 0x18DA_0000 | TESTER_ADDRESS as u32;

/// Bit separating an 11-bit response identifier from its request (`7E8` / `7E0`).
const RESPONSE_BIT_11BIT: u32 = 0x008;

//==================================================================================CAN_ID
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Raw CAN identifier; whether it is standard or extended travels with the frame.
pub struct CanId(pub u32);

impl CanId {
    /// Identifier truncated to the standard 11-bit range.
    pub fn standard(raw: u32) -> Self {
        CanId(raw & STANDARD_MASK)
    }

    /// Identifier truncated to the extended 29-bit range.
    pub fn extended(raw: u32) -> Self {
        CanId(raw & EXTENDED_MASK)
    }

    /// Physical request identifier from the tester to `ecu` (29-bit addressing).
    pub fn physical_request_for(ecu: u8) -> Self {
        CanId(PHYSICAL_REQUEST_BASE | ((ecu as u32) << 8))
    }

    /// Low byte: in 29-bit responses, the address of the answering ECU.
    pub fn ecu_address(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Request identifier paired with an 11-bit response (`7E8` → `7E0`).
    pub fn paired_request(&self) -> Self {
        CanId(self.0 & !RESPONSE_BIT_11BIT & STANDARD_MASK)
    }

    /// Identifier the tester must answer to, given a frame received from an ECU.
    pub fn reply_target(&self, extended: bool) -> Self {
        if extended {
            Self::physical_request_for(self.ecu_address())
        } else {
            self.paired_request()
        }
    }
}
