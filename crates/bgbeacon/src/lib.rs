//! bgbeacon - iBeacon broadcasting through a Bluegiga BGAPI radio
//!
//! This library drives a USB-attached Bluetooth Low Energy dongle (BLED112
//! and compatible) over its BGAPI serial protocol. It builds the iBeacon
//! advertisement and scan response payloads, sequences the commands that
//! start and stop advertising, and runs advertising on a duty cycle.

pub mod advertising;
pub mod beacon;
pub mod bgapi;
pub mod error;
pub mod radio;
pub mod scheduler;

#[cfg(test)]
mod testing;

// Re-export common types for convenience
pub use advertising::{
    build_primary_advertising_block, build_scan_response_block, AdvertisingDataSet,
};
pub use beacon::{BeaconParameters, BeaconParametersBuilder, DutyCycle};
pub use bgapi::{BgapiCommand, CommandFrame, ResponseValidator, SerialTransport, Transport};
pub use error::{Error, Result, TransportError, ValidationError};
pub use radio::{RadioController, RadioState};
pub use scheduler::{
    CancellationToken, Clock, CycleEvent, CycleObserver, DutyCycleScheduler, LogObserver,
    RunSummary, SystemClock,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_serial_port() {
        // A device path that cannot exist must fail before any scheduling
        let result = SerialTransport::open(
            "/dev/bgbeacon-does-not-exist",
            115200,
            bgapi::transport::DEFAULT_READ_TIMEOUT,
        );

        match result {
            Err(TransportError::Open { port, .. }) => {
                assert_eq!(port, "/dev/bgbeacon-does-not-exist")
            }
            Err(other) => panic!("unexpected error: {}", other),
            Ok(_) => panic!("opened a port that does not exist"),
        }
    }
}
