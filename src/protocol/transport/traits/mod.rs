//! Abstraction traits implemented by the board firmware: CAN bus and
//! controller, timer, supply-voltage sensor and transport responder.
pub mod can_bus;
pub mod can_control;
pub mod elm_timer;
pub mod responder;
pub mod voltage_sensor;
