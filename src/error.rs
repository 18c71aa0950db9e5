//! Error definitions shared across library modules.
//! Each type models a specific failure scenario (hex parsing, buffer capacity,
//! AT command validation, OBD request execution, CAN link pumping).
use thiserror_no_std::Error;

//==================================================================================HEX_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Failures while decoding hexadecimal text typed by the client.
pub enum HexError {
    /// Character outside `0-9`, `a-f`, `A-F`.
    #[error("Invalid hex digit: {digit}")]
    InvalidDigit { digit: char },
    /// Number of digits not accepted by the caller (odd byte string, too long…).
    #[error("Invalid hex length: {len}")]
    InvalidLength { len: usize },
}

//==================================================================================BUFFER_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// A fixed-capacity buffer refused a write.
pub enum BufferError {
    /// The write would exceed the buffer capacity.
    #[error("Buffer full: capacity {capacity}")]
    Full { capacity: usize },
}

//==================================================================================COMMAND_ERROR
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Reasons an AT command is answered with `?`.
pub enum CommandError {
    /// No dispatch table entry accepted the command.
    #[error("Unknown command")]
    Unknown,
    /// Argument has the wrong length or is not valid hex.
    #[error("Invalid argument")]
    InvalidArgument,
    /// Command depends on a setting that was never configured
    /// (e.g. flow-control mode 1 without header and data).
    #[error("Missing prerequisite")]
    MissingPrerequisite,
}

impl From<HexError> for CommandError {
    fn from(_: HexError) -> Self {
        CommandError::InvalidArgument
    }
}

//==================================================================================REQUEST_ERROR
#[derive(Error, Debug)]
/// Terminal failures of an OBD data request. None of them is fatal: the client
/// always receives a legacy literal followed by the prompt.
pub enum RequestError<E: core::fmt::Debug> {
    /// The selected protocol is not one of the ISO 15765-4 CAN variants.
    #[error("Protocol {protocol} is not a CAN protocol")]
    UnsupportedProtocol { protocol: char },
    /// Request payload does not fit a single frame (7 bytes max).
    #[error("Request payload too long: {len} bytes")]
    PayloadTooLong { len: usize },
    /// Request line is not a hex byte string.
    #[error("Malformed request: {0}")]
    Malformed(HexError),
    /// CAN controller rejected the request frame.
    #[error("CAN bus send error: {0:?}")]
    Send(E),
    /// CAN controller failed while collecting responses.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),
}

impl<E: core::fmt::Debug> From<HexError> for RequestError<E> {
    fn from(err: HexError) -> Self {
        RequestError::Malformed(err)
    }
}

//==================================================================================LINK_ERROR
#[derive(Error, Debug)]
/// Failures of the CAN receive pump.
pub enum LinkError<E: core::fmt::Debug> {
    /// The CAN driver returned an error while waiting for a frame.
    #[error("CAN bus receive error: {0:?}")]
    Receive(E),
}
