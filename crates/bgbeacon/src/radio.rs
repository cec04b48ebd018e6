//! Radio lifecycle controller
//!
//! `RadioController` owns the transport and walks the radio through the
//! fixed command sequences that start and stop iBeacon advertising. Every
//! command is sent and its response consumed before the next one goes out.

use crate::advertising::AdvertisingDataSet;
use crate::beacon::BeaconParameters;
use crate::bgapi::packet::{
    AdvChannels, BgapiCommand, GAP_ENHANCED_BROADCASTING, GAP_NON_CONNECTABLE,
    GAP_NON_DISCOVERABLE, GAP_SCANNABLE_NON_CONNECTABLE, GAP_USER_DATA,
};
use crate::bgapi::transport::{AcceptAnyResponse, ResponseValidator, Transport};
use crate::error::Result;
use log::{debug, info, trace, warn};
use std::fmt;

/// Connection handle torn down by the stop sequence. We never connect, but
/// the radio may hold a connection from before this process started.
pub const STALE_CONNECTION_HANDLE: u8 = 0;

/// What the controller believes the radio is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioState {
    /// Not known; a stop sequence is needed before anything else
    Unknown,
    Idle,
    Advertising,
}

impl fmt::Display for RadioState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RadioState::Unknown => write!(f, "unknown"),
            RadioState::Idle => write!(f, "idle"),
            RadioState::Advertising => write!(f, "advertising"),
        }
    }
}

/// Drives the radio between idle and advertising
pub struct RadioController<T: Transport, V: ResponseValidator = AcceptAnyResponse> {
    transport: T,
    validator: V,
    state: RadioState,
}

impl<T: Transport> RadioController<T> {
    /// Creates a controller that trusts response lengths only
    pub fn new(transport: T) -> Self {
        Self::with_validator(transport, AcceptAnyResponse)
    }
}

impl<T: Transport, V: ResponseValidator> RadioController<T, V> {
    /// Creates a controller that runs every response through `validator`
    pub fn with_validator(transport: T, validator: V) -> Self {
        Self {
            transport,
            validator,
            state: RadioState::Unknown,
        }
    }

    pub fn state(&self) -> RadioState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Give the transport back, e.g. to close it
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Force the radio idle.
    ///
    /// Drops any connection, leaves advertising mode and ends any scan, in
    /// that order. Safe to call whatever the radio is currently doing.
    pub fn stop(&mut self) -> Result<()> {
        let commands = [
            BgapiCommand::ConnectionDisconnect {
                connection: STALE_CONNECTION_HANDLE,
            },
            BgapiCommand::GapSetMode {
                discoverable: GAP_NON_DISCOVERABLE,
                connectable: GAP_NON_CONNECTABLE,
            },
            BgapiCommand::GapEndProcedure,
        ];

        self.state = RadioState::Unknown;

        // Stale bytes from an interrupted exchange would be read as responses
        self.transport.flush()?;
        self.run_sequence(&commands)?;

        self.state = RadioState::Idle;
        debug!("Radio is idle");
        Ok(())
    }

    /// Reset the radio and start advertising `params`
    pub fn start(&mut self, params: &BeaconParameters) -> Result<()> {
        // Build everything before the first byte is sent
        let data = AdvertisingDataSet::for_beacon(params)?;
        let commands = [
            BgapiCommand::GapSetAdvParameters {
                interval_min: params.adv_interval_min_ticks(),
                interval_max: params.adv_interval_max_ticks(),
                channels: AdvChannels::ALL,
            },
            BgapiCommand::set_adv_data(false, &data.advertisement)?,
            BgapiCommand::set_adv_data(true, &data.scan_response)?,
            BgapiCommand::GapSetMode {
                discoverable: GAP_USER_DATA | GAP_ENHANCED_BROADCASTING,
                connectable: GAP_SCANNABLE_NON_CONNECTABLE,
            },
        ];

        self.stop()?;

        self.state = RadioState::Unknown;
        self.run_sequence(&commands)?;

        self.state = RadioState::Advertising;
        info!(
            "Advertising {} major={:04X} minor={:04X}",
            hex::encode_upper(params.uuid()),
            params.major(),
            params.minor()
        );
        Ok(())
    }

    /// Reboot the radio. No response is read; the state becomes unknown.
    pub fn reset(&mut self, boot_in_dfu: bool) -> Result<()> {
        self.state = RadioState::Unknown;
        self.execute(&BgapiCommand::SystemReset { boot_in_dfu })
    }

    fn run_sequence(&mut self, commands: &[BgapiCommand]) -> Result<()> {
        for (step, command) in commands.iter().enumerate() {
            if let Err(e) = self.execute(command) {
                warn!(
                    "{} failed at step {}/{}: {}",
                    command.name(),
                    step + 1,
                    commands.len(),
                    e
                );
                return Err(e);
            }
        }
        Ok(())
    }

    fn execute(&mut self, command: &BgapiCommand) -> Result<()> {
        let packet = command.to_packet();
        debug!("Sending {}", command.name());
        trace!("{}: {}", command.name(), hex::encode(&packet));

        self.transport.send(&packet)?;

        if let Some(len) = command.response_len() {
            let response = self.transport.read_exact(len)?;
            self.validator.validate(command, &response)?;
        }
        Ok(())
    }
}
