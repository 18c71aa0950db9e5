//! Request identifier resolution and response filtering.
use crate::protocol::elm327::config::ElmConfig;
use crate::protocol::transport::{
    can_frame::CanFrame,
    can_id::CanId,
    FUNCTIONAL_ID_11BIT, FUNCTIONAL_ID_29BIT, RESPONSE_RANGE_11BIT, RESPONSE_RANGE_29BIT,
};

/// Identifier of the next request frame, recomputed from the configuration
/// for every request.
pub fn resolve_identifier(config: &ElmConfig) -> CanId {
    let extended = config.protocol.is_extended();
    match (config.header, extended) {
        (None, false) => CanId(FUNCTIONAL_ID_11BIT),
        (None, true) => CanId(FUNCTIONAL_ID_29BIT),
        (Some(header), false) => CanId::standard(header),
        (Some(header), true) => CanId::extended(((config.priority_bits as u32) << 24) | header),
    }
}

/// Whether `frame` is a response the client should see.
///
/// An explicit response filter (`atcra`) only lets its exact identifier
/// through. Without one, the standard diagnostic response ranges apply:
/// `7E8`-`7EF` in 11-bit, `18DAF1xx` in 29-bit.
pub fn accepts(frame: &CanFrame, config: &ElmConfig) -> bool {
    match config.rx_address {
        Some(address) => frame.id.0 == address,
        None if frame.extended => RESPONSE_RANGE_29BIT.contains(&frame.id.0),
        None => RESPONSE_RANGE_11BIT.contains(&frame.id.0),
    }
}
