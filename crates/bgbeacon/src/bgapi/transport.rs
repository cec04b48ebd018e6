//! Byte transport to the radio module
//!
//! The radio speaks strict half-duplex request/response: a frame is written,
//! then exactly the expected number of response bytes is read back before
//! the next frame may go out.

use crate::bgapi::packet::BgapiCommand;
use crate::error::{Error, TransportError};
use log::{debug, trace};
use serialport::{ClearBuffer, SerialPort};
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

/// Default serial read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Send-frame / read-response capability the controller drives
pub trait Transport {
    /// Write one complete frame
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Read exactly `len` bytes, or fail with a timeout carrying how many arrived
    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError>;

    /// Discard anything buffered in either direction
    fn flush(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        (**self).send(frame)
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        (**self).read_exact(len)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        (**self).flush()
    }
}

/// Checks a response before the next command is issued.
///
/// The radio's responses carry a result code, but only the length is relied
/// on today. Implement this to reject responses on their content.
pub trait ResponseValidator {
    fn validate(&self, command: &BgapiCommand, response: &[u8]) -> Result<(), Error>;
}

/// Accepts every response of the expected length
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAnyResponse;

impl ResponseValidator for AcceptAnyResponse {
    fn validate(&self, _command: &BgapiCommand, _response: &[u8]) -> Result<(), Error> {
        Ok(())
    }
}

/// Serial port connected to a USB radio dongle
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
    name: String,
}

impl SerialTransport {
    /// Opens the serial port
    ///
    /// # Arguments
    ///
    /// * `port` - Device path, e.g. `/dev/ttyACM0`
    /// * `baud_rate` - Line speed, 115200 for BLED112 dongles
    /// * `read_timeout` - Upper bound on each response read
    pub fn open(
        port: &str,
        baud_rate: u32,
        read_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let handle = serialport::new(port, baud_rate)
            .timeout(read_timeout)
            .open()
            .map_err(|source| TransportError::Open {
                port: port.to_string(),
                source,
            })?;

        debug!("Opened {} at {} baud", port, baud_rate);
        Ok(Self {
            port: handle,
            name: port.to_string(),
        })
    }

    /// Device path this transport was opened on
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Transport for SerialTransport {
    fn send(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        trace!("{} <- {}", self.name, hex::encode(frame));
        self.port.write_all(frame)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_exact(&mut self, len: usize) -> Result<Vec<u8>, TransportError> {
        let mut buffer = vec![0u8; len];
        let mut received = 0;

        while received < len {
            match self.port.read(&mut buffer[received..]) {
                Ok(0) => {
                    return Err(TransportError::Timeout {
                        expected: len,
                        received,
                    })
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == ErrorKind::TimedOut => {
                    return Err(TransportError::Timeout {
                        expected: len,
                        received,
                    })
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(TransportError::Io(e)),
            }
        }

        trace!("{} -> {}", self.name, hex::encode(&buffer));
        Ok(buffer)
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        self.port
            .clear(ClearBuffer::All)
            .map_err(|e| TransportError::Io(e.into()))
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        debug!("Closing {}", self.name);
    }
}
