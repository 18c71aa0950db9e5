//! Rendering of received frames as ELM327 response lines.
//!
//! ```text
//! show_header  spaces  line
//! off          on      41 00 BE 3F A8 13\r
//! on           on      7E8 06 41 00 BE 3F A8 13\r
//! on (+dlc)    off     7E88064100BE3FA813\r
//! ```
use crate::core::{ReplyText, REPLY_CAPACITY};
use crate::error::BufferError;
use crate::infra::hex::push_hex;
use crate::protocol::elm327::config::ElmConfig;
use crate::protocol::transport::can_frame::CanFrame;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Display flags relevant to response lines.
pub struct LineFormat {
    pub show_header: bool,
    pub display_dlc: bool,
    pub spaces: bool,
}

impl From<&ElmConfig> for LineFormat {
    fn from(config: &ElmConfig) -> Self {
        Self {
            show_header: config.show_header,
            display_dlc: config.display_dlc,
            spaces: config.spaces,
        }
    }
}

/// One response line for `frame`, whose relayed bytes are `payload`.
///
/// With headers on, the identifier (3 or 8 digits), the optional DLC digit and
/// the PCI byte come first. Groups are separated by a single space when
/// `spaces` is on; the line ends with `\r`.
pub fn format_frame(
    frame: &CanFrame,
    payload: &[u8],
    format: LineFormat,
) -> Result<ReplyText, BufferError> {
    let mut line = ReplyText::new();
    let mut first = true;
    let mut group = |line: &mut ReplyText, value: u32, width: usize| -> Result<(), BufferError> {
        if format.spaces && !first {
            push(line, " ")?;
        }
        first = false;
        push_hex(line, value, width)
    };

    if format.show_header {
        let width = if frame.extended { 8 } else { 3 };
        group(&mut line, frame.id.0, width)?;
        if format.display_dlc {
            group(&mut line, frame.len as u32, 1)?;
        }
        group(&mut line, frame.data[0] as u32, 2)?;
    }
    for byte in payload {
        group(&mut line, *byte as u32, 2)?;
    }
    push(&mut line, "\r")?;
    Ok(line)
}

fn push(line: &mut ReplyText, text: &str) -> Result<(), BufferError> {
    line.push_str(text).map_err(|_| BufferError::Full {
        capacity: REPLY_CAPACITY,
    })
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
