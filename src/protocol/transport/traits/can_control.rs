//! Reconfiguration of the CAN controller when the selected protocol changes
//! bitrate.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Nominal bitrates used by the supported protocols.
pub enum Bitrate {
    Kbps250,
    Kbps500,
}

impl Bitrate {
    /// Bits per second.
    pub fn bits_per_second(&self) -> u32 {
        match self {
            Bitrate::Kbps250 => 250_000,
            Bitrate::Kbps500 => 500_000,
        }
    }
}

/// Synchronous controller operations. The caller waits for the controller to
/// settle after each call.
pub trait CanControl {
    /// Stop the controller (bus off, no reception).
    fn disable(&mut self);
    /// Program a new bitrate; only called while disabled.
    fn set_bitrate(&mut self, bitrate: Bitrate);
    /// Restart the controller.
    fn enable(&mut self);
}
