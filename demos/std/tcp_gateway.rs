//! # TCP gateway demo
//!
//! Serves the ELM327 emulator on `127.0.0.1:35000`, the port OBD apps use for
//! Wi-Fi adapters, with a simulated ECU on the other side of an in-memory CAN
//! bus:
//! - Mode 01 PIDs `00`, `0C` (RPM) and `0D` (speed) as Single Frames
//! - Mode 09 PID `02` (VIN) as a First Frame followed by Consecutive Frames
//!
//! ```bash
//! cargo run --example tcp_gateway
//! # then, in another terminal
//! nc -C 127.0.0.1 35000
//! ```

use elm327_emu::protocol::{
    elm327::Elm327,
    transport::{
        can_frame::CanFrame,
        can_id::CanId,
        traits::{
            can_bus::CanBus,
            can_control::{Bitrate, CanControl},
            elm_timer::ElmTimer,
            responder::{HostChannel, Responder},
            voltage_sensor::FixedVoltage,
        },
    },
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{tcp::OwnedWriteHalf, TcpListener};
use tokio::sync::mpsc;

const VIN: &[u8; 17] = b"1D4GP25R43B123456";

/// One end of the in-memory bus.
struct SimBus {
    tx: mpsc::UnboundedSender<CanFrame>,
    rx: mpsc::UnboundedReceiver<CanFrame>,
}

fn bus_pair() -> (SimBus, SimBus) {
    let (a_tx, b_rx) = mpsc::unbounded_channel();
    let (b_tx, a_rx) = mpsc::unbounded_channel();
    (
        SimBus { tx: a_tx, rx: a_rx },
        SimBus { tx: b_tx, rx: b_rx },
    )
}

impl CanBus for SimBus {
    type Error = ();

    async fn send<'a>(&'a mut self, frame: &'a CanFrame) -> Result<(), Self::Error> {
        self.tx.send(frame.clone()).map_err(|_| ())
    }

    async fn recv<'a>(&'a mut self) -> Result<CanFrame, Self::Error> {
        self.rx.recv().await.ok_or(())
    }

    fn try_recv(&mut self) -> Option<CanFrame> {
        self.rx.try_recv().ok()
    }
}

/// Controller of the simulated bus: only reports bitrate changes.
struct SimControl;

impl CanControl for SimControl {
    fn disable(&mut self) {}

    fn set_bitrate(&mut self, bitrate: Bitrate) {
        println!("[can] bitrate {} bit/s", bitrate.bits_per_second());
    }

    fn enable(&mut self) {}
}

struct TokioTimer;

impl ElmTimer for TokioTimer {
    async fn delay<'a>(&'a mut self, duration: embassy_time::Duration) {
        tokio::time::sleep(std::time::Duration::from_micros(duration.as_micros())).await;
    }
}

/// Writes replies to the connected client.
struct SocketResponder {
    writer: OwnedWriteHalf,
}

impl Responder for SocketResponder {
    async fn respond<'a>(&'a mut self, _channel: HostChannel, bytes: &'a [u8]) {
        if let Err(err) = self.writer.write_all(bytes).await {
            eprintln!("[tcp] write failed: {err}");
        }
    }
}

/// ECU at 7E8 answering a handful of requests.
async fn simulated_ecu(mut bus: SimBus) {
    let reply = |payload: &[u8]| CanFrame::padded(CanId(0x7E8), false, payload, 0x00);

    while let Ok(request) = bus.recv().await {
        let frames: Vec<CanFrame> = match &request.data[..3] {
            [0x02, 0x01, 0x00] => vec![reply(&[0x06, 0x41, 0x00, 0xBE, 0x3F, 0xA8, 0x13])],
            // 1726 rpm
            [0x02, 0x01, 0x0C] => vec![reply(&[0x04, 0x41, 0x0C, 0x1A, 0xF8])],
            // 50 km/h
            [0x02, 0x01, 0x0D] => vec![reply(&[0x03, 0x41, 0x0D, 0x32])],
            [0x02, 0x09, 0x02] => {
                let mut first = vec![0x10, 0x14, 0x49, 0x02, 0x01];
                first.extend_from_slice(&VIN[..3]);
                if bus.send(&reply(&first)).await.is_err() {
                    return;
                }
                // Wait for the tester's flow control before the rest.
                match bus.recv().await {
                    Ok(fc) if fc.data[0] & 0xF0 == 0x30 => {}
                    _ => continue,
                }
                VIN[3..]
                    .chunks(7)
                    .enumerate()
                    .map(|(index, chunk)| {
                        let mut payload = vec![0x21 + index as u8];
                        payload.extend_from_slice(chunk);
                        reply(&payload)
                    })
                    .collect()
            }
            _ => vec![],
        };
        for frame in frames {
            if bus.send(&frame).await.is_err() {
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let (dut, ecu) = bus_pair();
    tokio::spawn(simulated_ecu(ecu));

    let mut elm = Elm327::new(dut, SimControl, TokioTimer, FixedVoltage(12.6));
    let listener = TcpListener::bind("127.0.0.1:35000").await?;
    println!("=== ELM327 emulator listening on 127.0.0.1:35000 ===");

    loop {
        let (socket, peer) = listener.accept().await?;
        println!("[tcp] client {peer}");
        let (mut reader, writer) = socket.into_split();
        let mut responder = SocketResponder { writer };
        let mut buf = [0u8; 256];

        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => elm.feed(HostChannel::Socket, &buf[..n], &mut responder).await,
            }
        }
        println!("[tcp] client {peer} gone");
    }
}
