//! ISO 15765-2 (ISO-TP) helpers needed by a single-frame tester: frame type
//! classification, request framing and flow-control synthesis.
//!
//! Every ISO-TP frame starts with a PCI byte whose high nibble is the frame
//! type:
//!
//! * `0x0_` Single Frame, low nibble is the payload length;
//! * `0x1_` First Frame of a segmented message;
//! * `0x2_` Consecutive Frame, low nibble is the sequence number;
//! * `0x3_` Flow Control, sent by the receiver of a First Frame.
use crate::protocol::transport::{can_frame::CanFrame, can_id::CanId, FILLER_BYTE};

/// Largest request payload fitting a Single Frame (8 bytes minus the PCI).
pub const MAX_SINGLE_FRAME_PAYLOAD: usize = 7;

/// Maximum number of user-defined flow-control bytes (`fcsd`).
pub const MAX_FLOW_CONTROL_DATA: usize = 5;

/// PCI of a "continue to send" flow-control frame.
const FLOW_STATUS_CONTINUE: u8 = 0x30;
/// Block size 0: the sender may transmit every remaining frame without waiting.
const BLOCK_SIZE_UNLIMITED: u8 = 0x00;
/// Minimum separation time requested between Consecutive Frames.
const SEPARATION_TIME_MS: u8 = 0x00;

//==================================================================================FRAME_KIND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// ISO-TP frame type decoded from the PCI byte.
pub enum FrameKind {
    /// Complete message; carries its own length (0 to 7).
    Single { len: u8 },
    /// Start of a segmented message.
    First,
    /// Continuation of a segmented message.
    Consecutive,
    /// Flow control emitted by the peer.
    FlowControl,
}

impl FrameKind {
    /// Classify a frame from its PCI byte. Unknown nibbles fall back to a
    /// Single Frame with the length clamped to seven bytes.
    pub fn classify(pci: u8) -> Self {
        match pci & 0xF0 {
            0x10 => FrameKind::First,
            0x20 => FrameKind::Consecutive,
            0x30 => FrameKind::FlowControl,
            _ => FrameKind::Single {
                len: pci.min(MAX_SINGLE_FRAME_PAYLOAD as u8),
            },
        }
    }

    /// Number of payload bytes following the PCI to relay to the client.
    pub fn payload_len(&self) -> usize {
        match self {
            FrameKind::Single { len } => *len as usize,
            _ => MAX_SINGLE_FRAME_PAYLOAD,
        }
    }
}

//==================================================================================FLOW_CONTROL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// How flow-control frames are built (`fcsm`).
pub enum FlowControlMode {
    /// Automatic identifier and standard "continue to send" payload.
    #[default]
    Auto = 0,
    /// User header and user data.
    Manual = 1,
    /// Automatic identifier, user data.
    AutoHeader = 2,
}

impl FlowControlMode {
    /// Mode from its `fcsm` digit.
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(FlowControlMode::Auto),
            1 => Some(FlowControlMode::Manual),
            2 => Some(FlowControlMode::AutoHeader),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Flow-control configuration set by `fcsh`, `fcsd` and `fcsm`.
pub struct FlowControlSettings {
    pub mode: FlowControlMode,
    /// User identifier (`fcsh`).
    pub header: Option<u32>,
    data: [u8; MAX_FLOW_CONTROL_DATA],
    data_len: u8,
}

impl FlowControlSettings {
    /// User data bytes (`fcsd`), empty when never set.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.data_len as usize]
    }

    /// Replace the user data. Returns `false` (and keeps the previous data)
    /// when `bytes` is empty or longer than five bytes.
    pub fn set_data(&mut self, bytes: &[u8]) -> bool {
        if bytes.is_empty() || bytes.len() > MAX_FLOW_CONTROL_DATA {
            return false;
        }
        self.data = [0; MAX_FLOW_CONTROL_DATA];
        self.data[..bytes.len()].copy_from_slice(bytes);
        self.data_len = bytes.len() as u8;
        true
    }

    /// Whether `mode` can be selected with the current header and data.
    pub fn supports(&self, mode: FlowControlMode) -> bool {
        match mode {
            FlowControlMode::Auto => true,
            FlowControlMode::Manual => self.header.is_some() && self.data_len > 0,
            FlowControlMode::AutoHeader => self.data_len > 0,
        }
    }
}

/// Frame answering the First Frame `trigger` according to `settings`.
pub fn flow_control_frame(trigger: &CanFrame, settings: &FlowControlSettings) -> CanFrame {
    let automatic = trigger.id.reply_target(trigger.extended);
    let id = match (settings.mode, settings.header) {
        (FlowControlMode::Manual, Some(header)) if trigger.extended => CanId::extended(header),
        (FlowControlMode::Manual, Some(header)) => CanId::standard(header),
        _ => automatic,
    };

    match settings.mode {
        FlowControlMode::Auto => CanFrame::padded(
            id,
            trigger.extended,
            &[FLOW_STATUS_CONTINUE, BLOCK_SIZE_UNLIMITED, SEPARATION_TIME_MS],
            FILLER_BYTE,
        ),
        FlowControlMode::Manual | FlowControlMode::AutoHeader => {
            CanFrame::padded(id, trigger.extended, settings.data(), FILLER_BYTE)
        }
    }
}

//==================================================================================REQUEST_FRAME
/// Single Frame carrying `payload` (at most seven bytes), padded to eight bytes.
pub fn single_frame(id: CanId, extended: bool, payload: &[u8]) -> Option<CanFrame> {
    if payload.len() > MAX_SINGLE_FRAME_PAYLOAD {
        return None;
    }
    let mut data = [FILLER_BYTE; 8];
    data[0] = payload.len() as u8;
    data[1..=payload.len()].copy_from_slice(payload);
    Some(CanFrame::padded(id, extended, &data, FILLER_BYTE))
}
