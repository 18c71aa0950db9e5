//! Receive pump and link: frames flow through the bounded channel, overflow
//! is dropped and counted, and the emulator runs over the link.

mod helpers {
    include!("helpers/mod.rs");
}

use elm327_emu::protocol::{
    elm327::Elm327,
    transport::{
        can_id::CanId,
        can_link::{split, FrameChannel},
        traits::{can_bus::CanBus, responder::HostChannel, voltage_sensor::FixedVoltage},
    },
};
use helpers::{ecu_frame, MockCanBus, MockControl, MockTimer, RecordingResponder};
use static_cell::StaticCell;

#[tokio::test]
/// A full channel drops new frames instead of blocking the pump.
async fn pump_drops_when_channel_full() {
    static CHANNEL: StaticCell<FrameChannel<2>> = StaticCell::new();
    let channel = CHANNEL.init(FrameChannel::new());

    let (dut, mut ecu) = MockCanBus::create_pair();
    let parts = split(dut.clone(), dut, channel);
    let mut link = parts.link;
    let mut pump = parts.pump;

    for pid in 0..5u8 {
        ecu.send(&ecu_frame(0x7E8, false, &[0x02, 0x41, pid])).await.unwrap();
    }
    for _ in 0..5 {
        pump.pump_once().await.unwrap();
    }

    assert_eq!(pump.dropped(), 3);
    assert_eq!(link.try_recv().map(|f| f.data[2]), Some(0));
    assert_eq!(link.try_recv().map(|f| f.data[2]), Some(1));
    assert!(link.try_recv().is_none());
}

#[tokio::test]
/// The pump stops with an error once the controller fails.
async fn pump_reports_receive_error() {
    static CHANNEL: StaticCell<FrameChannel<4>> = StaticCell::new();
    let channel = CHANNEL.init(FrameChannel::new());

    let (dut, ecu) = MockCanBus::create_pair();
    let parts = split(dut.clone(), dut, channel);
    drop(ecu);
    assert!(parts.pump.drive().await.is_err());
}

#[tokio::test]
/// Full request/response cycle with the pump running beside the emulator.
async fn emulator_over_link() {
    static CHANNEL: StaticCell<FrameChannel<8>> = StaticCell::new();
    let channel = CHANNEL.init(FrameChannel::new());

    let (dut, mut ecu) = MockCanBus::create_pair();
    let parts = split(dut.clone(), dut, channel);
    let mut elm = Elm327::new(parts.link, MockControl::default(), MockTimer, FixedVoltage(12.6));
    let mut responder = RecordingResponder::default();

    let ecu_task = tokio::spawn(async move {
        let request = ecu.recv().await.unwrap();
        assert_eq!(request.id, CanId(0x7DF));
        ecu.send(&ecu_frame(0x7E8, false, &[0x03, 0x41, 0x0D, 0x32]))
            .await
            .unwrap();
        ecu
    });

    let pump = parts.pump.drive();
    tokio::pin!(pump);
    tokio::select! {
        _ = &mut pump => panic!("pump stopped"),
        _ = elm.feed(HostChannel::Socket, b"010D1\r", &mut responder) => {}
    }

    assert_eq!(responder.text(HostChannel::Socket), "41 0D 32\r\r>");
    ecu_task.await.unwrap();
}
