//! Bluegiga BGAPI implementation
//!
//! This module provides the command frames and transport used to drive a
//! BGAPI radio module over its serial interface.

pub mod constants;
pub mod packet;
pub mod transport;

#[cfg(test)]
mod tests;

pub use packet::{AdvChannels, BgapiCommand, CommandFrame};
pub use transport::{AcceptAnyResponse, ResponseValidator, SerialTransport, Transport};
