//! Hexadecimal helpers for the text interface: identifiers, timeouts and data
//! bytes are typed by the client as hex digits, replies are rendered as
//! upper-case hex pairs.
use crate::error::{BufferError, HexError};
use core::fmt::Write;

fn decode_error(error: ::hex::FromHexError, len: usize) -> HexError {
    match error {
        ::hex::FromHexError::InvalidHexCharacter { c, .. } => HexError::InvalidDigit { digit: c },
        _ => HexError::InvalidLength { len },
    }
}

/// Parse up to eight hex digits into an integer.
pub fn parse_u32(text: &str) -> Result<u32, HexError> {
    let len = text.len();
    if len == 0 || len > 8 {
        return Err(HexError::InvalidLength { len });
    }
    let mut padded = [b'0'; 8];
    padded[8 - len..].copy_from_slice(text.as_bytes());
    let mut bytes = [0u8; 4];
    ::hex::decode_to_slice(padded, &mut bytes).map_err(|error| decode_error(error, len))?;
    Ok(u32::from_be_bytes(bytes))
}

/// Parse exactly `digits` hex digits, used by commands with a fixed-width argument.
pub fn parse_fixed(text: &str, digits: usize) -> Result<u32, HexError> {
    if text.len() != digits {
        return Err(HexError::InvalidLength { len: text.len() });
    }
    parse_u32(text)
}

/// Decode a string of hex pairs into `out`, returning the number of bytes written.
///
/// The string must hold an even number of digits and fit in `out`.
pub fn parse_bytes(text: &str, out: &mut [u8]) -> Result<usize, HexError> {
    let digits = text.as_bytes();
    let len = digits.len() / 2;
    if digits.len() % 2 != 0 || len > out.len() {
        return Err(HexError::InvalidLength { len: digits.len() });
    }
    ::hex::decode_to_slice(digits, &mut out[..len])
        .map_err(|error| decode_error(error, digits.len()))?;
    Ok(len)
}

/// Append `value` as `width` upper-case hex digits.
pub fn push_hex<const N: usize>(
    out: &mut heapless::String<N>,
    value: u32,
    width: usize,
) -> Result<(), BufferError> {
    write!(out, "{:0width$X}", value, width = width).map_err(|_| BufferError::Full { capacity: N })
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
