//! Split of the CAN controller between two tasks.
//!
//! The receive half runs in its own task ([`CanRxPump`]) and only pushes frames
//! into a bounded [`embassy_sync::channel::Channel`]; it never waits on the
//! emulator. When the channel is full the frame is dropped and counted.
//!
//! The emulator side ([`CanLink`]) owns the transmit half plus the channel
//! receiver and implements [`CanBus`], so the request engine sees an ordinary
//! bus. The firmware provides the pre-allocated channel; nothing is allocated
//! here.

use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{Channel, Receiver, Sender},
};
use futures_util::Future;

use crate::error::LinkError;
use crate::protocol::transport::can_frame::CanFrame;
use crate::protocol::transport::traits::can_bus::{CanBus, CanReceive, CanTransmit};

/// Channel type carrying received frames from the pump to the link.
pub type FrameChannel<const CAP: usize> = Channel<CriticalSectionRawMutex, CanFrame, CAP>;

/// Split a controller into its emulator-facing link and its receive pump.
pub fn split<'a, T, R, const CAP: usize>(
    transmit: T,
    receive: R,
    channel: &'a FrameChannel<CAP>,
) -> CanLinkParts<'a, T, R, CAP>
where
    T: CanTransmit,
    R: CanReceive,
{
    CanLinkParts {
        link: CanLink {
            transmit,
            frames: channel.receiver(),
        },
        pump: CanRxPump {
            receive,
            sender: channel.sender(),
            dropped: 0,
        },
    }
}

/// Bundle returned by [`split`].
pub struct CanLinkParts<'a, T: CanTransmit, R: CanReceive, const CAP: usize> {
    pub link: CanLink<'a, T, CAP>,
    pub pump: CanRxPump<'a, R, CAP>,
}

//==================================================================================CAN_RX_PUMP
/// Receive worker forwarding every frame into the channel.
pub struct CanRxPump<'a, R: CanReceive, const CAP: usize> {
    receive: R,
    sender: Sender<'a, CriticalSectionRawMutex, CanFrame, CAP>,
    dropped: u32,
}

impl<'a, R: CanReceive, const CAP: usize> CanRxPump<'a, R, CAP> {
    /// Number of frames lost because the channel was full.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Forward one frame. A full channel drops the frame instead of waiting.
    pub async fn pump_once(&mut self) -> Result<(), LinkError<R::Error>> {
        let frame = self.receive.receive().await.map_err(LinkError::Receive)?;
        if self.sender.try_send(frame).is_err() {
            self.dropped = self.dropped.wrapping_add(1);
            #[cfg(feature = "defmt")]
            defmt::warn!("CAN rx channel full, frame dropped ({})", self.dropped);
        }
        Ok(())
    }

    /// Run until the controller reports an error.
    pub async fn drive(mut self) -> Result<(), LinkError<R::Error>> {
        loop {
            self.pump_once().await?;
        }
    }
}

//==================================================================================CAN_LINK
/// Emulator-side bus: transmit half plus the pumped frames.
pub struct CanLink<'a, T: CanTransmit, const CAP: usize> {
    transmit: T,
    frames: Receiver<'a, CriticalSectionRawMutex, CanFrame, CAP>,
}

impl<'a, T: CanTransmit, const CAP: usize> CanBus for CanLink<'a, T, CAP> {
    type Error = T::Error;

    fn send<'b>(
        &'b mut self,
        frame: &'b CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'b {
        self.transmit.transmit(frame)
    }

    fn recv<'b>(&'b mut self) -> impl Future<Output = Result<CanFrame, Self::Error>> + 'b {
        async move { Ok(self.frames.receive().await) }
    }

    fn try_recv(&mut self) -> Option<CanFrame> {
        self.frames.try_receive().ok()
    }
}
