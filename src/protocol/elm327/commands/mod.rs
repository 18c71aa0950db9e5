//! AT command dispatcher.
//!
//! The text following `at` is matched against an ordered table of mnemonics:
//! an entry matches when the command starts with its mnemonic, and the rest of
//! the command is the argument. Several mnemonics share a prefix (`dpn`, `dp`,
//! `d`), so the order of the table is part of the behavior. A handler that
//! rejects its argument lets the scan continue with the following entries.
//!
//! Handlers validate their whole argument before writing to the
//! configuration: a rejected command never leaves a partial change behind.
use crate::error::CommandError;
use crate::infra::hex;
use crate::protocol::elm327::config::{ElmConfig, Protocol};
use crate::protocol::elm327::{DEVICE_DESCRIPTION, IDENTIFICATION, OK};
use crate::protocol::transport::isotp::{FlowControlMode, MAX_FLOW_CONTROL_DATA};

//==================================================================================AT_COMMAND
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Every AT command understood by the emulator.
pub enum AtCommand {
    /// `dpn`: protocol number.
    DescribeProtocolNumber,
    /// `dp`: protocol name.
    DescribeProtocol,
    /// `d0`/`d1`: DLC display in header mode.
    DisplayDlc,
    /// `d`: settings back to power-on, protocol kept.
    RestoreDefaults,
    /// `z`: full reset.
    Reset,
    /// `ws`: warm start.
    WarmStart,
    /// `sh`: request header.
    SetHeader,
    /// `spa`: protocol with automatic fallback.
    SetProtocolAuto,
    /// `sp`: protocol.
    SetProtocol,
    /// `st`: response timeout.
    SetTimeout,
    /// `s0`/`s1`: spaces between bytes.
    Spaces,
    /// `cp`: 29-bit priority bits.
    SetPriority,
    /// `cra`: response filter.
    SetReceiveAddress,
    /// `fcsh`: flow-control header.
    FlowControlHeader,
    /// `fcsd`: flow-control data.
    FlowControlData,
    /// `fcsm`: flow-control mode.
    FlowControlMode,
    /// `h0`/`h1`: identifiers in responses.
    Headers,
    /// `e0`/`e1`: echo.
    Echo,
    /// `l0`/`l1`: line feeds.
    Linefeed,
    /// `@1`: device description.
    DeviceDescription,
    /// `i`: identification.
    Identify,
    /// `rv`: supply voltage.
    ReadVoltage,
    /// Accepted for client compatibility, no effect.
    Ignored,
}

/// Ordered dispatch table, first matching prefix wins.
pub const COMMAND_TABLE: &[(&str, AtCommand)] = &[
    ("dpn", AtCommand::DescribeProtocolNumber),
    ("dp", AtCommand::DescribeProtocol),
    ("d", AtCommand::DisplayDlc),
    ("d", AtCommand::RestoreDefaults),
    ("z", AtCommand::Reset),
    ("ws", AtCommand::WarmStart),
    ("sh", AtCommand::SetHeader),
    ("spa", AtCommand::SetProtocolAuto),
    ("sp", AtCommand::SetProtocol),
    ("st", AtCommand::SetTimeout),
    ("s", AtCommand::Spaces),
    ("cp", AtCommand::SetPriority),
    ("cra", AtCommand::SetReceiveAddress),
    ("caf", AtCommand::Ignored),
    ("cfc", AtCommand::Ignored),
    ("fcsh", AtCommand::FlowControlHeader),
    ("fcsd", AtCommand::FlowControlData),
    ("fcsm", AtCommand::FlowControlMode),
    ("h", AtCommand::Headers),
    ("e", AtCommand::Echo),
    ("l", AtCommand::Linefeed),
    ("@1", AtCommand::DeviceDescription),
    ("i", AtCommand::Identify),
    ("rv", AtCommand::ReadVoltage),
    ("at", AtCommand::Ignored),
    ("al", AtCommand::Ignored),
    ("pc", AtCommand::Ignored),
    ("m", AtCommand::Ignored),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// What the emulator must do once a command was accepted.
pub enum Action {
    /// Write this reply.
    Reply(&'static str),
    /// Reply with the device description and discard the rest of the input chunk.
    Reset,
    /// Reply with the current supply voltage.
    ReadVoltage,
}

/// Run the command `command` (the line without its `at` prefix).
///
/// `power_on` is the configuration restored by `z`, `ws` and `d`.
pub fn dispatch(
    command: &str,
    config: &mut ElmConfig,
    power_on: &ElmConfig,
) -> Result<Action, CommandError> {
    let mut outcome = Err(CommandError::Unknown);
    for (mnemonic, entry) in COMMAND_TABLE {
        let Some(argument) = command.strip_prefix(mnemonic) else {
            continue;
        };
        outcome = entry.apply(argument, config, power_on);
        if outcome.is_ok() {
            #[cfg(feature = "defmt")]
            defmt::debug!("AT {} -> {}", mnemonic, entry);
            break;
        }
    }
    outcome
}

impl AtCommand {
    /// Validate `argument` and apply the command.
    pub fn apply(
        self,
        argument: &str,
        config: &mut ElmConfig,
        power_on: &ElmConfig,
    ) -> Result<Action, CommandError> {
        match self {
            AtCommand::DescribeProtocolNumber => {
                no_argument(argument)?;
                Ok(Action::Reply(config.protocol.number()))
            }
            AtCommand::DescribeProtocol => {
                no_argument(argument)?;
                Ok(Action::Reply(config.protocol.description()))
            }
            AtCommand::DisplayDlc => switch(argument, &mut config.display_dlc),
            AtCommand::RestoreDefaults => {
                no_argument(argument)?;
                config.restore_defaults(power_on);
                Ok(Action::Reply(OK))
            }
            AtCommand::Reset => {
                no_argument(argument)?;
                *config = *power_on;
                Ok(Action::Reset)
            }
            AtCommand::WarmStart => {
                no_argument(argument)?;
                *config = *power_on;
                Ok(Action::Reply(DEVICE_DESCRIPTION))
            }
            AtCommand::SetHeader => {
                let value = hex::parse_u32(argument)?;
                if !config.set_header(value, argument.len()) {
                    return Err(CommandError::InvalidArgument);
                }
                Ok(Action::Reply(OK))
            }
            AtCommand::SetProtocolAuto => {
                let protocol = match argument.len() {
                    0 | 1 => Protocol::from_char(argument.chars().next().unwrap_or('6'))
                        .filter(|protocol| protocol.is_can())
                        .unwrap_or_default(),
                    _ => return Err(CommandError::InvalidArgument),
                };
                config.protocol = protocol;
                Ok(Action::Reply(OK))
            }
            AtCommand::SetProtocol => {
                let mut chars = argument.chars();
                let protocol = match (chars.next(), chars.next()) {
                    (Some(c), None) => Protocol::from_char(c).ok_or(CommandError::InvalidArgument)?,
                    _ => return Err(CommandError::InvalidArgument),
                };
                config.protocol = protocol;
                Ok(Action::Reply(OK))
            }
            AtCommand::SetTimeout => {
                let units = hex::parse_fixed(argument, 2)? as u8;
                config.set_req_timeout(units);
                Ok(Action::Reply(OK))
            }
            AtCommand::Spaces => switch(argument, &mut config.spaces),
            AtCommand::SetPriority => {
                let value = hex::parse_fixed(argument, 2)? as u8;
                config.priority_bits = value & 0x1F;
                Ok(Action::Reply(OK))
            }
            AtCommand::SetReceiveAddress => {
                config.rx_address = match argument.len() {
                    0 => None,
                    3 | 8 => Some(hex::parse_u32(argument)?),
                    _ => return Err(CommandError::InvalidArgument),
                };
                Ok(Action::Reply(OK))
            }
            AtCommand::FlowControlHeader => {
                let header = match argument.len() {
                    3 | 8 => hex::parse_u32(argument)?,
                    _ => return Err(CommandError::InvalidArgument),
                };
                config.flow_control.header = Some(header);
                Ok(Action::Reply(OK))
            }
            AtCommand::FlowControlData => {
                let mut data = [0u8; MAX_FLOW_CONTROL_DATA];
                let len = hex::parse_bytes(argument, &mut data)?;
                if !config.flow_control.set_data(&data[..len]) {
                    return Err(CommandError::InvalidArgument);
                }
                Ok(Action::Reply(OK))
            }
            AtCommand::FlowControlMode => {
                let digit = hex::parse_fixed(argument, 1)? as u8;
                let mode =
                    FlowControlMode::from_digit(digit).ok_or(CommandError::InvalidArgument)?;
                if !config.flow_control.supports(mode) {
                    return Err(CommandError::MissingPrerequisite);
                }
                config.flow_control.mode = mode;
                Ok(Action::Reply(OK))
            }
            AtCommand::Headers => switch(argument, &mut config.show_header),
            AtCommand::Echo => switch(argument, &mut config.echo),
            AtCommand::Linefeed => switch(argument, &mut config.linefeed),
            AtCommand::DeviceDescription => {
                no_argument(argument)?;
                Ok(Action::Reply(DEVICE_DESCRIPTION))
            }
            AtCommand::Identify => {
                no_argument(argument)?;
                Ok(Action::Reply(IDENTIFICATION))
            }
            AtCommand::ReadVoltage => {
                no_argument(argument)?;
                Ok(Action::ReadVoltage)
            }
            AtCommand::Ignored => match argument {
                "" | "0" | "1" => Ok(Action::Reply(OK)),
                _ => Err(CommandError::InvalidArgument),
            },
        }
    }
}

fn no_argument(argument: &str) -> Result<(), CommandError> {
    if argument.is_empty() {
        Ok(())
    } else {
        Err(CommandError::InvalidArgument)
    }
}

/// `0`/`1` flag commands.
fn switch(argument: &str, flag: &mut bool) -> Result<Action, CommandError> {
    *flag = match argument {
        "0" => false,
        "1" => true,
        _ => return Err(CommandError::InvalidArgument),
    };
    Ok(Action::Reply(OK))
}
