//! Line accumulation and classification.
//!
//! Transports deliver arbitrary chunks of bytes; each channel keeps its own
//! [`LineBuffer`] across chunks. Spaces and line feeds are dropped, letters
//! are lower-cased, and a carriage return (or a full buffer) completes the
//! line.
use crate::core::LineBuffer;

/// Prefix of configuration commands.
const COMMAND_PREFIX: &str = "at";
/// Prefixes of vendor extensions answered with `?`.
const UNSUPPORTED_PREFIXES: [&str; 2] = ["vti", "sti"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Meaning of a completed line.
pub enum LineKind<'a> {
    /// AT command, without its `at` prefix.
    Command(&'a str),
    /// Vendor extension (`vti`, `sti`).
    Unsupported,
    /// OBD data request.
    Request(&'a str),
    /// Nothing but a terminator.
    Empty,
}

/// Add one received byte to `buffer`. Returns `true` when the line is complete.
pub fn accumulate(buffer: &mut LineBuffer, byte: u8) -> bool {
    match byte {
        b'\r' => true,
        b' ' | b'\n' => false,
        byte if !byte.is_ascii() => false,
        byte => buffer.push(byte.to_ascii_lowercase()).is_err() || buffer.is_full(),
    }
}

/// Classify a completed line.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.is_empty() {
        LineKind::Empty
    } else if let Some(command) = line.strip_prefix(COMMAND_PREFIX) {
        LineKind::Command(command)
    } else if UNSUPPORTED_PREFIXES
        .iter()
        .any(|prefix| line.starts_with(prefix))
    {
        LineKind::Unsupported
    } else {
        LineKind::Request(line)
    }
}
