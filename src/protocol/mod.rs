//! High-level components: the CAN/ISO-TP transport layer and the ELM327
//! emulator built on it.
pub mod elm327;
pub mod transport;
