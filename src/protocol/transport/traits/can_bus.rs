//! Minimal abstraction for an asynchronous CAN bus. Allows the library to plug
//! into various implementations (embedded HAL, desktop driver, etc.).
use crate::protocol::transport::can_frame::CanFrame;
use futures_util::Future;

/// Contract to send and receive CAN frames asynchronously.
pub trait CanBus {
    type Error: core::fmt::Debug;
    /// Emit a frame on the bus. Asynchronous to accommodate non-blocking drivers.
    fn send<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
    /// Retrieve the next available frame. Asynchronously waits until data arrives.
    fn recv<'a>(
        &'a mut self,
    ) -> impl core::future::Future<Output = Result<CanFrame, Self::Error>> + 'a;
    /// Next frame already queued, without waiting.
    fn try_recv(&mut self) -> Option<CanFrame>;
}

/// Transmit half of a CAN controller.
pub trait CanTransmit {
    type Error: core::fmt::Debug;
    /// Emit a frame on the bus.
    fn transmit<'a>(
        &'a mut self,
        frame: &'a CanFrame,
    ) -> impl Future<Output = Result<(), Self::Error>> + 'a;
}

/// Receive half of a CAN controller, driven by its own task.
pub trait CanReceive {
    type Error: core::fmt::Debug;
    /// Wait for the next frame.
    fn receive<'a>(&'a mut self) -> impl Future<Output = Result<CanFrame, Self::Error>> + 'a;
}
