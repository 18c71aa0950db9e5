//! Request/response engine for OBD data lines.
//!
//! A data line such as `0100` or `09021` becomes one Single Frame request.
//! Responses are then collected until the expected count is reached or no
//! accepted frame arrived for a whole timeout window:
//!
//! ```text
//! Idle -> Sent -> Collecting -> (Accepted | TimedOut) -> Idle
//! ```
//!
//! The window restarts in full on every accepted frame; frames rejected by the
//! response filter leave it running. A First Frame is answered with a single
//! flow-control frame straight away so the ECU sends the rest of the message.
use futures_util::{future::select, future::Either, pin_mut};

use crate::error::{HexError, RequestError};
use crate::infra::hex;
use crate::protocol::elm327::addressing::{accepts, resolve_identifier};
use crate::protocol::elm327::config::{ElmConfig, Protocol};
use crate::protocol::elm327::formatter::{format_frame, LineFormat};
use crate::protocol::transport::{
    can_frame::CanFrame,
    isotp::{flow_control_frame, single_frame, FrameKind, MAX_SINGLE_FRAME_PAYLOAD},
    traits::{
        can_bus::CanBus,
        elm_timer::ElmTimer,
        responder::{HostChannel, Responder},
    },
};

/// Reply when nothing answered, or when the protocol has no bus to send on.
const NO_DATA_REPLY: &str = "NO DATA\r\r>";
/// Reply for the non-CAN protocols other than J1850.
const BUS_INIT_ERROR_REPLY: &str = "BUS INIT: ...ERROR\r\r>";
/// Reply to a line that is not a valid request.
const UNKNOWN_REPLY: &str = "?\r\r>";
/// Prompt closing a request that produced lines.
const PROMPT: &str = "\r>";

/// Legacy code of an unbounded response count.
pub const UNBOUNDED_RESPONSES: u8 = 0xFF;

//==================================================================================EXPECTED_RESPONSES
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Number of response lines the client asked for.
pub enum ExpectedResponses {
    /// Stop as soon as this many lines (1 to 9) were relayed.
    Count(u8),
    /// Collect until the timeout expires.
    Unbounded,
}

impl ExpectedResponses {
    /// Count from the trailing digit of an odd-length line. `0` and anything
    /// that is not a decimal digit mean unbounded.
    pub fn from_digit(digit: u8) -> Self {
        match digit {
            b'1'..=b'9' => ExpectedResponses::Count(digit - b'0'),
            _ => ExpectedResponses::Unbounded,
        }
    }

    /// Single-byte encoding (`0xFF` for unbounded).
    pub fn legacy_code(&self) -> u8 {
        match self {
            ExpectedResponses::Count(count) => *count,
            ExpectedResponses::Unbounded => UNBOUNDED_RESPONSES,
        }
    }

    /// Whether `received` lines complete the request.
    pub fn is_reached(&self, received: u8) -> bool {
        match self {
            ExpectedResponses::Count(count) => received >= *count,
            ExpectedResponses::Unbounded => false,
        }
    }
}

//==================================================================================DATA_REQUEST
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Parsed data line.
pub struct DataRequest {
    payload: [u8; MAX_SINGLE_FRAME_PAYLOAD],
    len: usize,
    pub expected: ExpectedResponses,
}

impl DataRequest {
    /// Parse a data line: hex pairs, optionally followed by one count digit.
    pub fn parse<E: core::fmt::Debug>(line: &str) -> Result<Self, RequestError<E>> {
        let (digits, expected) = match line.as_bytes() {
            [head @ .., last] if line.len() % 2 == 1 => {
                (&line[..head.len()], ExpectedResponses::from_digit(*last))
            }
            _ => (line, ExpectedResponses::Unbounded),
        };
        if digits.len() / 2 > MAX_SINGLE_FRAME_PAYLOAD {
            return Err(RequestError::PayloadTooLong {
                len: digits.len() / 2,
            });
        }
        if digits.is_empty() {
            return Err(RequestError::Malformed(HexError::InvalidLength { len: 0 }));
        }
        let mut payload = [0u8; MAX_SINGLE_FRAME_PAYLOAD];
        let len = hex::parse_bytes(digits, &mut payload)?;
        Ok(Self {
            payload,
            len,
            expected,
        })
    }

    /// Request bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload[..self.len]
    }
}

//==================================================================================TRANSACTION
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// The request in flight: the frame sent and the lines relayed so far.
pub struct Transaction {
    pub frame: CanFrame,
    pub expected: ExpectedResponses,
    pub received: u8,
}

impl Transaction {
    /// Build the request frame for `request` under `config`.
    pub fn new(request: &DataRequest, config: &ElmConfig) -> Option<Self> {
        let frame = single_frame(
            resolve_identifier(config),
            config.protocol.is_extended(),
            request.payload(),
        )?;
        Some(Self {
            frame,
            expected: request.expected,
            received: 0,
        })
    }

    /// Count one relayed line. Returns `true` once the expected count is reached.
    pub fn record(&mut self) -> bool {
        self.received = self.received.saturating_add(1);
        self.expected.is_reached(self.received)
    }

    /// Terminal state of the transaction.
    pub fn outcome(&self) -> Outcome {
        match self.received {
            0 => Outcome::TimedOut,
            lines => Outcome::Accepted { lines },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// How a request ended.
pub enum Outcome {
    /// At least one line was relayed.
    Accepted { lines: u8 },
    /// No accepted frame within the timeout (`NO DATA`).
    TimedOut,
}

//==================================================================================ENGINE
/// Reply used when `protocol` cannot carry a request.
fn unsupported_protocol_reply(protocol: Protocol) -> &'static str {
    match protocol {
        Protocol::SAE_J1850_PWM | Protocol::SAE_J1850_VPW => NO_DATA_REPLY,
        _ => BUS_INIT_ERROR_REPLY,
    }
}

/// Execute the data line `line`, writing every reply to `channel`.
///
/// The client always receives a complete reply ending with the prompt, errors
/// included; the error is returned for the caller's logs.
pub async fn execute<B, T, R>(
    line: &str,
    config: &ElmConfig,
    bus: &mut B,
    timer: &mut T,
    responder: &mut R,
    channel: HostChannel,
) -> Result<Outcome, RequestError<B::Error>>
where
    B: CanBus,
    T: ElmTimer,
    R: Responder,
{
    if !config.protocol.is_can() {
        responder
            .respond(channel, unsupported_protocol_reply(config.protocol).as_bytes())
            .await;
        return Err(RequestError::UnsupportedProtocol {
            protocol: config.protocol.as_char(),
        });
    }

    let transaction = DataRequest::parse(line)
        .and_then(|request| {
            Transaction::new(&request, config).ok_or(RequestError::PayloadTooLong {
                len: request.payload().len(),
            })
        });
    let mut transaction = match transaction {
        Ok(transaction) => transaction,
        Err(err) => {
            responder.respond(channel, UNKNOWN_REPLY.as_bytes()).await;
            return Err(err);
        }
    };

    // Frames left over from a previous request must not be taken as answers.
    while bus.try_recv().is_some() {}

    if let Err(err) = bus.send(&transaction.frame).await {
        #[cfg(feature = "defmt")]
        defmt::warn!("Request send failed: {}", defmt::Debug2Format(&err));
        responder.respond(channel, NO_DATA_REPLY.as_bytes()).await;
        return Err(RequestError::Send(err));
    }
    #[cfg(feature = "defmt")]
    defmt::debug!(
        "Request sent: {}, expecting {=u8:#x}",
        transaction.frame,
        transaction.expected.legacy_code()
    );

    let window = config.response_timeout();
    let format = LineFormat::from(config);
    let mut failure = None;

    'window: loop {
        let deadline = timer.delay(window);
        pin_mut!(deadline);

        loop {
            let event = {
                let next = bus.recv();
                pin_mut!(next);
                match select(next, deadline.as_mut()).await {
                    Either::Left((result, _)) => Some(result),
                    Either::Right(((), _)) => None,
                }
            };

            let frame = match event {
                Some(Ok(frame)) => frame,
                Some(Err(err)) => {
                    failure = Some(err);
                    break 'window;
                }
                None => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Response window elapsed");
                    break 'window;
                }
            };
            if !accepts(&frame, config) {
                continue;
            }

            relay(&frame, config, format, bus, responder, channel).await;
            if transaction.record() {
                break 'window;
            }
            continue 'window;
        }
    }

    let outcome = transaction.outcome();
    let closing = match outcome {
        Outcome::TimedOut => NO_DATA_REPLY,
        Outcome::Accepted { .. } => PROMPT,
    };
    responder.respond(channel, closing.as_bytes()).await;

    match failure {
        Some(err) => Err(RequestError::Receive(err)),
        None => Ok(outcome),
    }
}

/// Write the line of an accepted frame, answering First Frames with flow control.
async fn relay<B, R>(
    frame: &CanFrame,
    config: &ElmConfig,
    format: LineFormat,
    bus: &mut B,
    responder: &mut R,
    channel: HostChannel,
) where
    B: CanBus,
    R: Responder,
{
    let kind = FrameKind::classify(frame.data[0]);
    if kind == FrameKind::First {
        let flow_control = flow_control_frame(frame, &config.flow_control);
        match bus.send(&flow_control).await {
            Ok(()) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("Flow control sent: {}", flow_control);
            }
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("Flow control send failed: {}", defmt::Debug2Format(&_err));
            }
        }
    }

    let len = kind.payload_len().min(frame.len.saturating_sub(1));
    match format_frame(frame, &frame.data[1..=len], format) {
        Ok(line) => responder.respond(channel, line.as_bytes()).await,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::warn!("Response line dropped: {}", _err);
        }
    }
}
