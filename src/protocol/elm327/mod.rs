//! ELM327 virtual modem.
//!
//! [`Elm327`] is the single worker owning the configuration, one line buffer
//! per transport channel and the request engine. Transports hand it raw bytes
//! through [`Elm327::feed`]; every reply is written back to the channel the
//! line came from through a [`Responder`].
//!
//! ```rust,ignore
//! let mut elm = Elm327::new(link, controller, timer, FixedVoltage(12.6));
//! loop {
//!     let n = socket.read(&mut buf).await?;
//!     elm.feed(HostChannel::Socket, &buf[..n], &mut socket_writer).await;
//! }
//! ```
use core::fmt::Write;

use embassy_time::Duration;

use crate::core::{reply_from, LineBuffer, ReplyText};
use crate::protocol::transport::{
    traits::{
        can_bus::CanBus,
        can_control::{Bitrate, CanControl},
        elm_timer::ElmTimer,
        responder::{HostChannel, Responder},
        voltage_sensor::VoltageSensor,
    },
    CAN_SETTLE_DELAY_MS,
};

pub mod addressing;
pub mod commands;
pub mod config;
pub mod formatter;
pub mod line;
pub mod request;

use commands::Action;
use config::ElmConfig;
use line::LineKind;

/// Reply to `atz`, `atws` and `at@1`.
pub const DEVICE_DESCRIPTION: &str = "ELM327 v1.3a";
/// Reply to `ati`.
pub const IDENTIFICATION: &str = "OBDLink MX";
/// Reply to an accepted setting.
pub const OK: &str = "OK";
/// Reply to anything not understood.
pub const UNKNOWN: &str = "?";
/// Prompt written once a line has been fully handled.
pub const PROMPT: &str = "\r>";

//==================================================================================ELM327
/// ELM327 emulator bound to its CAN bus, controller, timer and voltage sensor.
pub struct Elm327<C, K, T, V>
where
    C: CanBus,
    K: CanControl,
    T: ElmTimer,
    V: VoltageSensor,
{
    bus: C,
    control: K,
    timer: T,
    sensor: V,
    config: ElmConfig,
    power_on: ElmConfig,
    lines: [LineBuffer; HostChannel::COUNT],
    active_bitrate: Option<Bitrate>,
}

impl<C, K, T, V> Elm327<C, K, T, V>
where
    C: CanBus,
    K: CanControl,
    T: ElmTimer,
    V: VoltageSensor,
{
    /// Emulator starting from the default configuration.
    pub fn new(bus: C, control: K, timer: T, sensor: V) -> Self {
        Self::with_config(bus, control, timer, sensor, ElmConfig::default())
    }

    /// Emulator starting from `power_on`, also restored by `atz`.
    ///
    /// The controller is assumed to already run at the bitrate of the
    /// power-on protocol.
    pub fn with_config(bus: C, control: K, timer: T, sensor: V, power_on: ElmConfig) -> Self {
        Self {
            bus,
            control,
            timer,
            sensor,
            config: power_on,
            power_on,
            lines: [LineBuffer::new(); HostChannel::COUNT],
            active_bitrate: power_on.protocol.bitrate(),
        }
    }

    /// Current configuration.
    pub fn config(&self) -> &ElmConfig {
        &self.config
    }

    /// Process bytes received on `channel`.
    ///
    /// Completed lines are handled in order. After `atz` the rest of `bytes`
    /// is discarded.
    pub async fn feed<R: Responder>(
        &mut self,
        channel: HostChannel,
        bytes: &[u8],
        responder: &mut R,
    ) {
        let slot = channel.index();
        for &byte in bytes {
            if !line::accumulate(&mut self.lines[slot], byte) {
                continue;
            }
            let completed = self.lines[slot];
            self.lines[slot].clear();

            if self.handle_line(channel, completed.as_str(), responder).await == Flow::Discard {
                break;
            }
        }
    }

    async fn handle_line<R: Responder>(
        &mut self,
        channel: HostChannel,
        text: &str,
        responder: &mut R,
    ) -> Flow {
        match line::classify(text) {
            LineKind::Empty => Flow::Continue,
            LineKind::Unsupported => {
                self.reply(channel, UNKNOWN, responder).await;
                Flow::Continue
            }
            LineKind::Command(command) => self.run_command(channel, command, responder).await,
            LineKind::Request(data) => {
                let outcome = request::execute(
                    data,
                    &self.config,
                    &mut self.bus,
                    &mut self.timer,
                    responder,
                    channel,
                )
                .await;
                match outcome {
                    Ok(_outcome) => {
                        #[cfg(feature = "defmt")]
                        defmt::info!("Request {} -> {}", data, _outcome);
                    }
                    Err(_err) => {
                        #[cfg(feature = "defmt")]
                        defmt::warn!("Request {} failed: {}", data, defmt::Debug2Format(&_err));
                    }
                }
                Flow::Continue
            }
        }
    }

    async fn run_command<R: Responder>(
        &mut self,
        channel: HostChannel,
        command: &str,
        responder: &mut R,
    ) -> Flow {
        let action = commands::dispatch(command, &mut self.config, &self.power_on);
        let flow = match action {
            Ok(Action::Reply(text)) => {
                self.reply(channel, text, responder).await;
                Flow::Continue
            }
            Ok(Action::Reset) => {
                self.reply(channel, DEVICE_DESCRIPTION, responder).await;
                Flow::Discard
            }
            Ok(Action::ReadVoltage) => {
                let mut text = ReplyText::new();
                let reading = self
                    .sensor
                    .supply_voltage()
                    .and_then(|volts| write!(text, "{:.1}V", volts).ok());
                let text = match reading {
                    Some(()) => text.as_str(),
                    None => UNKNOWN,
                };
                responder_reply(channel, text, self.config.line_terminator(), responder).await;
                Flow::Continue
            }
            Err(_err) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("AT {} rejected: {}", command, _err);
                self.reply(channel, UNKNOWN, responder).await;
                Flow::Continue
            }
        };
        self.sync_bitrate().await;
        flow
    }

    /// Write `text` with the line terminator, then the prompt.
    async fn reply<R: Responder>(&self, channel: HostChannel, text: &str, responder: &mut R) {
        responder_reply(channel, text, self.config.line_terminator(), responder).await;
    }

    /// Re-tune the controller when the selected protocol runs at another bitrate.
    async fn sync_bitrate(&mut self) {
        let Some(bitrate) = self.config.protocol.bitrate() else {
            return;
        };
        if self.active_bitrate == Some(bitrate) {
            return;
        }
        #[cfg(feature = "defmt")]
        defmt::info!("CAN bitrate -> {}", bitrate);

        let settle = Duration::from_millis(CAN_SETTLE_DELAY_MS);
        self.control.disable();
        self.timer.delay(settle).await;
        self.control.set_bitrate(bitrate);
        self.timer.delay(settle).await;
        self.control.enable();
        self.timer.delay(settle).await;
        self.active_bitrate = Some(bitrate);
    }
}

/// Reply framing shared by every command: text and terminator in one write,
/// then the prompt.
async fn responder_reply<R: Responder>(
    channel: HostChannel,
    text: &str,
    terminator: &str,
    responder: &mut R,
) {
    match reply_from(&[text, terminator]) {
        Ok(line) => responder.respond(channel, line.as_bytes()).await,
        Err(_) => {
            responder.respond(channel, text.as_bytes()).await;
            responder.respond(channel, terminator.as_bytes()).await;
        }
    }
    responder.respond(channel, PROMPT.as_bytes()).await;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whether the rest of the current input chunk is still processed.
enum Flow {
    Continue,
    Discard,
}
