//! Byte-stream transports the emulator answers on.
use futures_util::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Transport a line came from; replies are routed back to the same one.
pub enum HostChannel {
    /// TCP socket (Wi-Fi).
    Socket,
    /// BLE serial service.
    Radio,
    /// UART / USB serial.
    Serial,
}

impl HostChannel {
    /// Number of channels, one line buffer each.
    pub const COUNT: usize = 3;

    /// Dense index, used to select the channel's line buffer.
    pub fn index(&self) -> usize {
        match self {
            HostChannel::Socket => 0,
            HostChannel::Radio => 1,
            HostChannel::Serial => 2,
        }
    }
}

/// Writer for the reply bytes of one channel.
pub trait Responder {
    /// Write `bytes` to `channel`. Transport errors are the writer's concern.
    fn respond<'a>(
        &'a mut self,
        channel: HostChannel,
        bytes: &'a [u8],
    ) -> impl Future<Output = ()> + 'a;
}
