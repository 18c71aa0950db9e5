//! Fixed-capacity storage shared by the emulator: the per-channel line buffer
//! fed by the transports and the text type used for every reply line.
//!
//! Nothing in this crate allocates. Buffers refuse writes past their capacity
//! instead of growing, so a misbehaving client can never push the emulator
//! outside its static memory budget.
use crate::error::BufferError;

/// Maximum number of characters kept for one command line.
pub const LINE_CAPACITY: usize = 128;

/// Capacity of one rendered reply line (`18DAF110 8 10 14 49 02 01 31 44 34\r` fits).
pub const REPLY_CAPACITY: usize = 64;

/// Text of a single reply written back to a transport.
pub type ReplyText = heapless::String<REPLY_CAPACITY>;

//==================================================================================LINE_BUFFER
/// Raw command characters accumulated for one transport channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBuffer {
    len: usize,
    data: [u8; LINE_CAPACITY],
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineBuffer {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            len: 0,
            data: [0; LINE_CAPACITY],
        }
    }

    /// Number of valid bytes stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks whether the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// `true` once no further byte can be stored.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == LINE_CAPACITY
    }

    /// Reset the buffer.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Append one byte, rejecting it when the buffer is full.
    pub fn push(&mut self, byte: u8) -> Result<(), BufferError> {
        if self.is_full() {
            return Err(BufferError::Full {
                capacity: LINE_CAPACITY,
            });
        }
        self.data[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Immutable view over the populated bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Stored line as text. Only ASCII is ever pushed by the accumulator, a
    /// buffer filled by hand with invalid UTF-8 reads as empty.
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(self.as_slice()).unwrap_or("")
    }
}

//==================================================================================REPLY_TEXT
/// Build a reply from string fragments, failing if the result does not fit.
pub fn reply_from(parts: &[&str]) -> Result<ReplyText, BufferError> {
    let mut text = ReplyText::new();
    for part in parts {
        text.push_str(part).map_err(|_| BufferError::Full {
            capacity: REPLY_CAPACITY,
        })?;
    }
    Ok(text)
}
