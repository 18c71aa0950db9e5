//! Emulator configuration: selected protocol, request header, response filter,
//! timeout, flow control and display flags.
//!
//! The configuration is owned by the [`Elm327`](crate::protocol::elm327::Elm327)
//! worker and only mutated while a completed command line is processed.
use embassy_time::Duration;

use crate::protocol::transport::traits::can_control::Bitrate;
use crate::protocol::transport::isotp::FlowControlSettings;

/// Default priority bits of a 29-bit header (`18xxxxxx`).
pub const DEFAULT_PRIORITY_BITS: u8 = 0x18;

/// Default raw timeout unit (`0x32` × 4.096 ms ≈ 205 ms).
pub const DEFAULT_REQ_TIMEOUT: u8 = 0x32;

/// Duration of one timeout unit, in microseconds.
pub const TIMEOUT_UNIT_US: u64 = 4096;

//==================================================================================PROTOCOL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// OBD protocol selected with `atsp`, identified by its ELM327 character
/// (`0`-`9`, `a`-`c`). Only `6` to `9` are CAN protocols served by this emulator.
pub struct Protocol(char);

impl Default for Protocol {
    fn default() -> Self {
        Protocol::ISO15765_11BIT_500K
    }
}

impl Protocol {
    pub const AUTO: Protocol = Protocol('0');
    pub const SAE_J1850_PWM: Protocol = Protocol('1');
    pub const SAE_J1850_VPW: Protocol = Protocol('2');
    pub const ISO15765_11BIT_500K: Protocol = Protocol('6');
    pub const ISO15765_29BIT_500K: Protocol = Protocol('7');
    pub const ISO15765_11BIT_250K: Protocol = Protocol('8');
    pub const ISO15765_29BIT_250K: Protocol = Protocol('9');

    /// Protocol from its character, either case.
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            c @ ('0'..='9' | 'a'..='c') => Some(Protocol(c)),
            _ => None,
        }
    }

    /// Protocol character as stored (lower case).
    pub fn as_char(&self) -> char {
        self.0
    }

    /// Protocol number as printed by `atdpn` (upper-case hex digit).
    pub fn number(&self) -> &'static str {
        match self.0 {
            '0' => "0",
            '1' => "1",
            '2' => "2",
            '3' => "3",
            '4' => "4",
            '5' => "5",
            '6' => "6",
            '7' => "7",
            '8' => "8",
            '9' => "9",
            'a' => "A",
            'b' => "B",
            _ => "C",
        }
    }

    /// ISO 15765-4 CAN variant handled by the request engine.
    pub fn is_can(&self) -> bool {
        matches!(self.0, '6'..='9')
    }

    /// CAN variant with 29-bit identifiers.
    pub fn is_extended(&self) -> bool {
        matches!(self.0, '7' | '9')
    }

    /// Controller bitrate for the CAN variants.
    pub fn bitrate(&self) -> Option<Bitrate> {
        match self.0 {
            '6' | '7' => Some(Bitrate::Kbps500),
            '8' | '9' => Some(Bitrate::Kbps250),
            _ => None,
        }
    }

    /// Name printed by `atdp`.
    pub fn description(&self) -> &'static str {
        match self.0 {
            '0' => "AUTO",
            '1' => "SAE J1850 PWM",
            '2' => "SAE J1850 VPW",
            '3' => "ISO 9141-2",
            '4' => "ISO 14230-4 KWP/5",
            '5' => "ISO 14230-4 KWP",
            '6' => "ISO 15765-4 CAN (11 bit ID, 500 kbaud)",
            '7' => "ISO 15765-4 CAN (29 bit ID, 500 kbaud)",
            '8' => "ISO 15765-4 CAN (11 bit ID, 250 kbaud)",
            '9' => "ISO 15765-4 CAN (29 bit ID, 250 kbaud)",
            'a' => "SAE J1939 (CAN 29/250)",
            'b' => "USER1 CAN (11* bit ID, 125* baud)",
            _ => "USER2 CAN (11* bit ID, 50* baud)",
        }
    }
}

//==================================================================================ELM_CONFIG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Complete emulator state altered by AT commands.
pub struct ElmConfig {
    /// Request header (`atsh`), `None` for the functional default.
    pub header: Option<u32>,
    /// Leading bits of 29-bit headers (5 bits used).
    pub priority_bits: u8,
    pub protocol: Protocol,
    /// Explicit response filter (`atcra`).
    pub rx_address: Option<u32>,
    /// Response timeout in 4.096 ms units (`atst`).
    pub req_timeout: u8,
    pub flow_control: FlowControlSettings,
    pub echo: bool,
    pub linefeed: bool,
    pub spaces: bool,
    pub show_header: bool,
    pub display_dlc: bool,
}

impl Default for ElmConfig {
    fn default() -> Self {
        Self {
            header: None,
            priority_bits: DEFAULT_PRIORITY_BITS,
            protocol: Protocol::default(),
            rx_address: None,
            req_timeout: DEFAULT_REQ_TIMEOUT,
            flow_control: FlowControlSettings::default(),
            echo: true,
            linefeed: true,
            spaces: true,
            show_header: false,
            display_dlc: false,
        }
    }
}

impl ElmConfig {
    // Builder entry point
    /// Creates a builder starting from the default configuration.
    pub fn builder() -> ElmConfigBuilder {
        ElmConfigBuilder::new()
    }

    /// Time to wait for each response frame.
    pub fn response_timeout(&self) -> Duration {
        Duration::from_micros(self.req_timeout as u64 * TIMEOUT_UNIT_US)
    }

    /// Set the timeout, 0 meaning the default.
    pub fn set_req_timeout(&mut self, units: u8) {
        self.req_timeout = if units == 0 {
            DEFAULT_REQ_TIMEOUT
        } else {
            units
        };
    }

    /// Store a request header typed with `digits` hex digits. Eight digits
    /// carry the priority bits in their top byte; 3 and 6 digits keep the
    /// current priority. Returns `false`, leaving the config untouched, for
    /// any other width.
    pub fn set_header(&mut self, value: u32, digits: usize) -> bool {
        match digits {
            3 | 6 => self.header = Some(value),
            8 => {
                self.priority_bits = ((value >> 24) & 0x1F) as u8;
                self.header = Some(value & 0x00FF_FFFF);
            }
            _ => return false,
        }
        true
    }

    /// Terminator appended to command replies.
    pub fn line_terminator(&self) -> &'static str {
        if self.linefeed {
            "\r\n"
        } else {
            "\r"
        }
    }

    /// `atd`: every setting back to `power_on`, except the protocol.
    pub fn restore_defaults(&mut self, power_on: &ElmConfig) {
        let protocol = self.protocol;
        *self = *power_on;
        self.protocol = protocol;
    }
}

//==================================================================================ELM_CONFIG_BUILDER
#[derive(Debug)]
/// Fluent builder for the power-on configuration.
pub struct ElmConfigBuilder {
    config: ElmConfig,
}

impl Default for ElmConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ElmConfigBuilder {
    /// Starts from [`ElmConfig::default`].
    pub fn new() -> Self {
        Self {
            config: ElmConfig::default(),
        }
    }

    /// Selects the power-on protocol.
    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.config.protocol = protocol;
        self
    }

    /// Sets the request header. Values wider than 24 bits are full 29-bit
    /// headers and also set the priority bits, as an 8-digit `atsh` does.
    pub fn header(mut self, header: u32) -> Self {
        let digits = if header > 0x00FF_FFFF { 8 } else { 6 };
        self.config.set_header(header, digits);
        self
    }

    /// Sets the priority bits of 29-bit headers (5 bits used).
    pub fn priority_bits(mut self, bits: u8) -> Self {
        self.config.priority_bits = bits & 0x1F;
        self
    }

    /// Sets the timeout in 4.096 ms units (0 keeps the default).
    pub fn req_timeout(mut self, units: u8) -> Self {
        self.config.set_req_timeout(units);
        self
    }

    pub fn echo(mut self, on: bool) -> Self {
        self.config.echo = on;
        self
    }

    pub fn linefeed(mut self, on: bool) -> Self {
        self.config.linefeed = on;
        self
    }

    pub fn spaces(mut self, on: bool) -> Self {
        self.config.spaces = on;
        self
    }

    pub fn show_header(mut self, on: bool) -> Self {
        self.config.show_header = on;
        self
    }

    /// Finalizes the configuration.
    pub fn build(self) -> ElmConfig {
        self.config
    }
}
