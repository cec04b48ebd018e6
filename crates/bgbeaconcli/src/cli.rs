//! Command line arguments

use bgbeacon::beacon::{
    DEFAULT_DUTY_DURATION, DEFAULT_DUTY_PERIOD, DEFAULT_INTERVAL_MS, DEFAULT_LOCAL_NAME,
};
use bgbeacon::{BeaconParameters, DutyCycle, ValidationError};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// AirLocate UUID, used when none is given
pub const DEFAULT_UUID: &str = "E2C56DB5-DFFB-48D2-B060-D0F5A71096E0";

/// Errors in the arguments, reported before the serial port is touched
#[derive(Error, Debug)]
pub enum ArgsError {
    #[error("Invalid UUID '{0}', must be 16 bytes in 0-padded hex form, e.g. -u 0123456789abcdef0123456789abcdef")]
    Uuid(String),

    #[error("Invalid {field} '{value}', must be 2 bytes in 0-padded hex form, e.g. 01cf")]
    Hex16 { field: &'static str, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Bluetooth Smart iBeacon for Bluegiga BLED112 dongles
#[derive(Parser, Debug, Clone)]
#[command(name = "bgbeacon", version, about, long_about = None)]
pub struct Args {
    /// Serial port device name
    #[arg(short, long, default_value = "/dev/ttyACM0")]
    pub port: String,

    /// Serial port baud rate
    #[arg(short, long, default_value_t = 115200)]
    pub baud: u32,

    /// iBeacon UUID (default AirLocate)
    #[arg(short, long, default_value = DEFAULT_UUID)]
    pub uuid: String,

    /// iBeacon major, 4 hex digits
    #[arg(short = 'j', long, default_value = "0001")]
    pub major: String,

    /// iBeacon minor, 4 hex digits
    #[arg(short = 'n', long, default_value = "0001")]
    pub minor: String,

    /// Advertisement interval in ms (min 30, max 10230)
    #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
    pub interval: u16,

    /// Local name sent in scan responses
    #[arg(long, default_value = DEFAULT_LOCAL_NAME)]
    pub name: String,

    /// Report scan requests (Bluegiga enhanced broadcasting)
    #[arg(short, long)]
    pub scanreq: bool,

    /// Suppress the parameter summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Advertisement activity duration in seconds
    #[arg(short, long, default_value_t = DEFAULT_DUTY_DURATION.as_secs())]
    pub duration: u64,

    /// Advertisement activation period in seconds
    #[arg(short = 't', long, default_value_t = DEFAULT_DUTY_PERIOD.as_secs())]
    pub period: u64,

    /// Advertise continuously until interrupted instead of duty cycling
    #[arg(long, conflicts_with_all = ["end", "reset"])]
    pub once: bool,

    /// Stop any advertising in progress and exit
    #[arg(short, long, conflicts_with = "reset")]
    pub end: bool,

    /// Reset the radio module and exit
    #[arg(long)]
    pub reset: bool,

    /// Directory for the wakeup event log
    #[arg(long, default_value = "resources")]
    pub resource_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Validate the arguments into beacon parameters
    pub fn beacon_parameters(&self) -> Result<BeaconParameters, ArgsError> {
        let duty_cycle = if self.once {
            DutyCycle::run_once()
        } else {
            DutyCycle::new(
                Duration::from_secs(self.duration),
                Duration::from_secs(self.period),
            )?
        };

        Ok(BeaconParameters::builder(parse_uuid(&self.uuid)?)
            .major(parse_hex16("major", &self.major)?)
            .minor(parse_hex16("minor", &self.minor)?)
            .interval_ms(self.interval)
            .local_name(self.name.clone())
            .scan_request_reporting(self.scanreq)
            .duty_cycle(duty_cycle)
            .build()?)
    }
}

fn strip_separators(value: &str) -> String {
    value.chars().filter(|c| *c != ':' && *c != '-').collect()
}

/// Parse a UUID written as 32 hex digits, optionally split by '-' or ':'
pub fn parse_uuid(value: &str) -> Result<[u8; 16], ArgsError> {
    let digits = strip_separators(value);
    if digits.len() != 32 {
        return Err(ArgsError::Uuid(value.to_string()));
    }
    Uuid::try_parse(&digits)
        .map(|uuid| *uuid.as_bytes())
        .map_err(|_| ArgsError::Uuid(value.to_string()))
}

/// Parse a 16-bit value written as exactly 4 hex digits
pub fn parse_hex16(field: &'static str, value: &str) -> Result<u16, ArgsError> {
    let mut bytes = [0u8; 2];
    hex::decode_to_slice(strip_separators(value), &mut bytes).map_err(|_| ArgsError::Hex16 {
        field,
        value: value.to_string(),
    })?;
    Ok(u16::from_be_bytes(bytes))
}
