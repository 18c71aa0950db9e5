//! CAN transport layer of the emulator: frame representation, 11/29-bit
//! identifiers, ISO 15765-2 (ISO-TP) frame classification and flow control,
//! the receive pump feeding the emulator, and the collaborator traits.
//!
//! ## Timing and addressing constants
//!
//! Values below follow the ISO 15765-4 diagnostic addressing conventions used
//! by every OBD-II tester.

pub mod can_frame;
pub mod can_id;
pub mod can_link;
pub mod isotp;
pub mod traits;

/// Delay observed after each CAN controller reconfiguration step (ms).
///
/// Controllers such as the ESP32 TWAI need a few milliseconds between
/// `disable`, `set_bitrate` and `enable` before accepting new frames.
pub const CAN_SETTLE_DELAY_MS: u64 = 10;

/// Filler written in every unused byte of an outgoing frame.
///
/// Frames are always sent with a DLC of 8, as required by ISO 15765-4.
pub const FILLER_BYTE: u8 = 0xAA;

/// Functional (broadcast) request identifier for 11-bit protocols.
pub const FUNCTIONAL_ID_11BIT: u32 = 0x7DF;

/// Functional (broadcast) request identifier for 29-bit protocols.
pub const FUNCTIONAL_ID_29BIT: u32 = 0x18DB_33F1;

/// First and last identifiers of the 11-bit ECU response block.
pub const RESPONSE_RANGE_11BIT: core::ops::RangeInclusive<u32> = 0x7E8..=0x7EF;

/// Half-open range of 29-bit physical responses addressed to the tester (`F1`).
pub const RESPONSE_RANGE_29BIT: core::ops::Range<u32> = 0x18DA_F100..0x18DA_F200;
