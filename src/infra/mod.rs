//! Infrastructure helpers independent of the ELM327 semantics.
pub mod hex;
