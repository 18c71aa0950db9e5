//! Supply voltage source answering `atrv`.

/// Reads the vehicle supply voltage.
pub trait VoltageSensor {
    /// Voltage in volts, `None` when no reading is available.
    fn supply_voltage(&mut self) -> Option<f32>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Sensor reporting a constant voltage, for boards without an ADC input.
pub struct FixedVoltage(pub f32);

impl VoltageSensor for FixedVoltage {
    fn supply_voltage(&mut self) -> Option<f32> {
        Some(self.0)
    }
}
