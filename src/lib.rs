//! `elm327-emu` library: a `no_std` ELM327 virtual modem that exposes a CAN bus
//! through the legacy AT/OBD text interface. The crate provides the fixed-size
//! buffers and hex helpers (infra), the CAN/ISO-TP transport layer, and the
//! emulator itself (configuration, command dispatch, request/response engine).
#![no_std]
//==================================================================================
/// Fixed-capacity buffers shared by the line accumulator and the formatter.
pub mod core;
/// Hex parsing, buffer, command and request errors.
pub mod error;
/// Low-level helpers: hexadecimal parsing and rendering.
pub mod infra;
/// CAN transport (frames, identifiers, ISO-TP, collaborator traits) and the
/// ELM327 emulator built on top of it.
pub mod protocol;
//==================================================================================
