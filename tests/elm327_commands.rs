//! Command-path integration tests: reply framing, channel routing, and the
//! controller side effects of protocol changes.

mod helpers {
    include!("helpers/mod.rs");
}

use elm327_emu::protocol::{
    elm327::{config::ElmConfig, config::Protocol, Elm327},
    transport::traits::{
        can_control::Bitrate,
        responder::HostChannel,
        voltage_sensor::{FixedVoltage, VoltageSensor},
    },
};
use helpers::{ControlCall, MockCanBus, MockControl, MockTimer, RecordingResponder};

/// Sensor without a reading.
struct NoSensor;

impl VoltageSensor for NoSensor {
    fn supply_voltage(&mut self) -> Option<f32> {
        None
    }
}

fn emulator() -> (
    Elm327<MockCanBus, MockControl, MockTimer, FixedVoltage>,
    MockControl,
) {
    let (dut, _ecu) = MockCanBus::create_pair();
    let control = MockControl::default();
    let elm = Elm327::new(dut, control.clone(), MockTimer, FixedVoltage(12.63));
    (elm, control)
}

#[tokio::test]
/// Reply and terminator form one write, the prompt a second one.
async fn reply_framing() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();

    elm.feed(HostChannel::Socket, b"ATI\r", &mut responder).await;
    assert_eq!(
        responder.writes(HostChannel::Socket),
        vec!["OBDLink MX\r\n".to_string(), "\r>".to_string()]
    );

    responder.clear();
    elm.feed(HostChannel::Socket, b"atl0\r", &mut responder).await;
    elm.feed(HostChannel::Socket, b"at@1\r", &mut responder).await;
    assert_eq!(responder.text(HostChannel::Socket), "OK\r\r>ELM327 v1.3a\r\r>");
}

#[tokio::test]
async fn unknown_command_answers_question_mark() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(HostChannel::Serial, b"atqq\r", &mut responder).await;
    assert_eq!(responder.text(HostChannel::Serial), "?\r\n\r>");
    assert_eq!(*elm.config(), ElmConfig::default());
}

#[tokio::test]
/// Empty lines produce nothing.
async fn empty_lines_are_ignored() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(HostChannel::Socket, b"\r\r \r\n", &mut responder).await;
    assert!(responder.text(HostChannel::Socket).is_empty());
}

#[tokio::test]
/// Each channel accumulates its own line and gets its own replies.
async fn channels_are_independent() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();

    elm.feed(HostChannel::Socket, b"at", &mut responder).await;
    elm.feed(HostChannel::Radio, b"atd", &mut responder).await;
    elm.feed(HostChannel::Socket, b"i\r", &mut responder).await;
    elm.feed(HostChannel::Radio, b"pn\r", &mut responder).await;

    assert_eq!(responder.text(HostChannel::Socket), "OBDLink MX\r\n\r>");
    assert_eq!(responder.text(HostChannel::Radio), "6\r\n\r>");
    assert!(responder.text(HostChannel::Serial).is_empty());
}

#[tokio::test]
/// Several commands in one chunk are all answered in order.
async fn pipelined_commands() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(HostChannel::Socket, b"ate0\rath1\ratdp\r", &mut responder)
        .await;
    assert_eq!(
        responder.text(HostChannel::Socket),
        "OK\r\n\r>OK\r\n\r>ISO 15765-4 CAN (11 bit ID, 500 kbaud)\r\n\r>"
    );
    assert!(!elm.config().echo);
    assert!(elm.config().show_header);
}

#[tokio::test]
async fn read_voltage() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(HostChannel::Socket, b"atrv\r", &mut responder).await;
    assert_eq!(responder.text(HostChannel::Socket), "12.6V\r\n\r>");

    let (dut, _ecu) = MockCanBus::create_pair();
    let mut elm = Elm327::new(dut, MockControl::default(), MockTimer, NoSensor);
    responder.clear();
    elm.feed(HostChannel::Socket, b"atrv\r", &mut responder).await;
    assert_eq!(responder.text(HostChannel::Socket), "?\r\n\r>");
}

#[tokio::test]
/// Switching to a protocol with another bitrate re-tunes the controller once.
async fn protocol_change_retunes_controller() {
    let (mut elm, control) = emulator();
    let mut responder = RecordingResponder::default();

    elm.feed(HostChannel::Socket, b"atsp7\r", &mut responder).await;
    assert!(control.calls().is_empty());

    elm.feed(HostChannel::Socket, b"atsp8\r", &mut responder).await;
    assert_eq!(
        control.calls(),
        vec![
            ControlCall::Disable,
            ControlCall::SetBitrate(Bitrate::Kbps250),
            ControlCall::Enable,
        ]
    );

    // Same bitrate, then a non-CAN protocol: nothing to do.
    elm.feed(HostChannel::Socket, b"atsp9\ratsp1\r", &mut responder).await;
    assert_eq!(control.calls().len(), 3);

    // Reset brings back protocol 6 at 500 kbit/s.
    elm.feed(HostChannel::Socket, b"atz\r", &mut responder).await;
    assert_eq!(elm.config().protocol, Protocol::ISO15765_11BIT_500K);
    assert_eq!(
        control.calls()[3..],
        [
            ControlCall::Disable,
            ControlCall::SetBitrate(Bitrate::Kbps500),
            ControlCall::Enable,
        ]
    );
}

#[tokio::test]
/// `atz` restores the configuration given at construction.
async fn reset_restores_power_on_configuration() {
    let (dut, _ecu) = MockCanBus::create_pair();
    let power_on = ElmConfig::builder()
        .protocol(Protocol::ISO15765_29BIT_500K)
        .linefeed(false)
        .build();
    let mut elm = Elm327::with_config(
        dut,
        MockControl::default(),
        MockTimer,
        FixedVoltage(12.0),
        power_on,
    );
    let mut responder = RecordingResponder::default();

    elm.feed(HostChannel::Socket, b"atsp6\ratl1\rath1\r", &mut responder)
        .await;
    responder.clear();
    elm.feed(HostChannel::Socket, b"atz\r", &mut responder).await;

    assert_eq!(*elm.config(), power_on);
    assert_eq!(responder.text(HostChannel::Socket), "ELM327 v1.3a\r\r>");
}

#[tokio::test]
/// `atd` keeps the protocol and is idempotent.
async fn restore_defaults_keeps_protocol() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(
        HostChannel::Socket,
        b"atsp9\ratsh7e0\ratcp1a\rats0\ratfcsd300000\ratfcsm2\r",
        &mut responder,
    )
    .await;

    elm.feed(HostChannel::Socket, b"atd\r", &mut responder).await;
    let once = *elm.config();
    elm.feed(HostChannel::Socket, b"atd\r", &mut responder).await;

    assert_eq!(once, *elm.config());
    let expected = ElmConfig {
        protocol: Protocol::ISO15765_29BIT_250K,
        ..ElmConfig::default()
    };
    assert_eq!(*elm.config(), expected);
}

#[tokio::test]
/// A refused `fcsm1` leaves the mode untouched.
async fn flow_control_mode_prerequisite() {
    let (mut elm, _) = emulator();
    let mut responder = RecordingResponder::default();
    elm.feed(HostChannel::Socket, b"atfcsm1\r", &mut responder).await;
    assert_eq!(responder.text(HostChannel::Socket), "?\r\n\r>");
    assert_eq!(*elm.config(), ElmConfig::default());
}
