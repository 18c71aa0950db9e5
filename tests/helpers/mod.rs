/// Test doubles simulating the CAN bus, controller, timer and transports
/// during integration tests.
use elm327_emu::protocol::transport::{
    can_frame::CanFrame,
    can_id::CanId,
    traits::{
        can_bus::{CanBus, CanReceive, CanTransmit},
        can_control::{Bitrate, CanControl},
        elm_timer::ElmTimer,
        responder::{HostChannel, Responder},
    },
};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, Duration};

#[derive(Clone)]
#[allow(dead_code)]
/// In-memory CAN bus reproducing the `CanBus` trait behavior.
pub struct MockCanBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: Arc<Mutex<mpsc::UnboundedReceiver<CanFrame>>>,
}

#[allow(dead_code)]
impl MockCanBus {
    /// Construct a pair of interconnected buses (emulator ↔ simulated ECU).
    pub fn create_pair() -> (Self, Self) {
        let (dut_tx, host_rx) = mpsc::unbounded_channel();
        let (host_tx, dut_rx) = mpsc::unbounded_channel();

        let dut_bus = Self {
            tx: dut_tx,
            rx: Arc::new(Mutex::new(dut_rx)),
        };

        let host_bus = Self {
            tx: host_tx,
            rx: Arc::new(Mutex::new(host_rx)),
        };

        (dut_bus, host_bus)
    }

    /// Every frame currently queued, without waiting.
    pub fn drain(&mut self) -> Vec<CanFrame> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

impl CanBus for MockCanBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())?;
        Ok(())
    }

    async fn recv<'a>(&'a mut self) -> Result<CanFrame, Self::Error> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(())
    }

    fn try_recv(&mut self) -> Option<CanFrame> {
        self.rx.try_lock().ok()?.try_recv().ok()
    }
}

impl CanTransmit for MockCanBus {
    type Error = ();

    async fn transmit<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.send(frame).await
    }
}

impl CanReceive for MockCanBus {
    type Error = ();

    async fn receive<'a>(&'a mut self) -> Result<CanFrame, Self::Error> {
        self.recv().await
    }
}

#[allow(dead_code)]
/// Timer based on `tokio::time::sleep` to drive delays in tests.
pub struct MockTimer;

impl ElmTimer for MockTimer {
    async fn delay<'a>(&'a mut self, duration: embassy_time::Duration) {
        sleep(Duration::from_micros(duration.as_micros())).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(dead_code)]
/// Controller operation recorded by [`MockControl`].
pub enum ControlCall {
    Disable,
    SetBitrate(Bitrate),
    Enable,
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// CAN controller recording every reconfiguration call.
pub struct MockControl {
    calls: Arc<StdMutex<Vec<ControlCall>>>,
}

#[allow(dead_code)]
impl MockControl {
    pub fn calls(&self) -> Vec<ControlCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CanControl for MockControl {
    fn disable(&mut self) {
        self.calls.lock().unwrap().push(ControlCall::Disable);
    }

    fn set_bitrate(&mut self, bitrate: Bitrate) {
        self.calls.lock().unwrap().push(ControlCall::SetBitrate(bitrate));
    }

    fn enable(&mut self) {
        self.calls.lock().unwrap().push(ControlCall::Enable);
    }
}

#[derive(Default)]
#[allow(dead_code)]
/// Transport writer keeping every write with its channel.
pub struct RecordingResponder {
    writes: Vec<(HostChannel, Vec<u8>)>,
}

#[allow(dead_code)]
impl RecordingResponder {
    /// Every write made on `channel`, in order.
    pub fn writes(&self, channel: HostChannel) -> Vec<String> {
        self.writes
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, bytes)| String::from_utf8_lossy(bytes).into_owned())
            .collect()
    }

    /// Concatenated output of `channel`.
    pub fn text(&self, channel: HostChannel) -> String {
        self.writes(channel).concat()
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl Responder for RecordingResponder {
    async fn respond<'a>(&'a mut self, channel: HostChannel, bytes: &'a [u8]) {
        self.writes.push((channel, bytes.to_vec()));
    }
}

#[allow(dead_code)]
/// Frame as sent by an ECU: the payload as given, DLC 8.
pub fn ecu_frame(id: u32, extended: bool, payload: &[u8]) -> CanFrame {
    CanFrame::padded(CanId(id), extended, payload, 0x00)
}
