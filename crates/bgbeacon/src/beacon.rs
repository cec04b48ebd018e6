//! Beacon configuration
//!
//! `BeaconParameters` is validated once when built and never changes after.
//! Everything that can be rejected is rejected here, before any frame is
//! sent to the radio.

use crate::advertising::build_scan_response_block;
use crate::error::ValidationError;
use std::time::Duration;

/// Calibrated RSSI at one metre, advertised in every iBeacon frame (0xC6)
pub const MEASURED_POWER: i8 = -58;

pub const MIN_INTERVAL_MS: u16 = 30;
pub const MAX_INTERVAL_MS: u16 = 10230;
pub const DEFAULT_INTERVAL_MS: u16 = 100;

/// The radio may pick any interval within this many ms of the requested one
pub const INTERVAL_WINDOW_MS: u16 = 10;

pub const DEFAULT_LOCAL_NAME: &str = "MOB-1443";

pub const DEFAULT_DUTY_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_DUTY_PERIOD: Duration = Duration::from_secs(300);

/// Convert milliseconds to 0.625 ms advertising ticks, rounding down
pub fn ms_to_ticks(ms: u16) -> u16 {
    (u32::from(ms) * 8 / 5) as u16
}

/// Convert 0.625 ms advertising ticks back to milliseconds, rounding down
pub fn ticks_to_ms(ticks: u16) -> u16 {
    (u32::from(ticks) * 5 / 8) as u16
}

/// When and for how long the radio advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DutyCycle {
    duration: Duration,
    period: Duration,
    run_once: bool,
}

impl DutyCycle {
    /// Advertise for `duration` at the start of every `period`
    pub fn new(duration: Duration, period: Duration) -> Result<Self, ValidationError> {
        if duration.is_zero() {
            return Err(ValidationError::InvalidDutyCycle(
                "duration must be at least one second".into(),
            ));
        }
        if period.is_zero() {
            return Err(ValidationError::InvalidDutyCycle(
                "period must be at least one second".into(),
            ));
        }
        Ok(Self {
            duration,
            period,
            run_once: false,
        })
    }

    /// Start advertising once and keep going until cancelled
    pub fn run_once() -> Self {
        Self {
            duration: Duration::MAX,
            period: Duration::MAX,
            run_once: true,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_run_once(&self) -> bool {
        self.run_once
    }

    /// Time left idle in each period; zero when duration covers the period
    pub fn idle_time(&self) -> Duration {
        self.period.saturating_sub(self.duration)
    }
}

impl Default for DutyCycle {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DUTY_DURATION,
            period: DEFAULT_DUTY_PERIOD,
            run_once: false,
        }
    }
}

/// Everything needed to configure and run one beacon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeaconParameters {
    uuid: [u8; 16],
    major: u16,
    minor: u16,
    interval_ms: u16,
    measured_power: i8,
    local_name: String,
    scan_request_reporting: bool,
    duty_cycle: DutyCycle,
}

impl BeaconParameters {
    /// Start building parameters for the given 16-byte UUID
    pub fn builder(uuid: impl AsRef<[u8]>) -> BeaconParametersBuilder {
        BeaconParametersBuilder::new(uuid.as_ref())
    }

    pub fn uuid(&self) -> &[u8; 16] {
        &self.uuid
    }

    pub fn major(&self) -> u16 {
        self.major
    }

    pub fn minor(&self) -> u16 {
        self.minor
    }

    pub fn interval_ms(&self) -> u16 {
        self.interval_ms
    }

    /// Lower bound of the advertising window, in ticks
    pub fn adv_interval_min_ticks(&self) -> u16 {
        ms_to_ticks(self.interval_ms - INTERVAL_WINDOW_MS)
    }

    /// Upper bound of the advertising window, in ticks
    pub fn adv_interval_max_ticks(&self) -> u16 {
        ms_to_ticks(self.interval_ms + INTERVAL_WINDOW_MS)
    }

    pub fn measured_power(&self) -> i8 {
        self.measured_power
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether the user asked for scan request reporting.
    ///
    /// Informational only. The start sequence always enables enhanced
    /// broadcasting, so the radio reports scan requests either way.
    pub fn scan_request_reporting(&self) -> bool {
        self.scan_request_reporting
    }

    pub fn duty_cycle(&self) -> DutyCycle {
        self.duty_cycle
    }
}

/// Builder for [`BeaconParameters`]
#[derive(Debug, Clone)]
pub struct BeaconParametersBuilder {
    uuid: Vec<u8>,
    major: u16,
    minor: u16,
    interval_ms: u16,
    local_name: String,
    scan_request_reporting: bool,
    duty_cycle: DutyCycle,
}

impl BeaconParametersBuilder {
    fn new(uuid: &[u8]) -> Self {
        Self {
            uuid: uuid.to_vec(),
            major: 1,
            minor: 1,
            interval_ms: DEFAULT_INTERVAL_MS,
            local_name: DEFAULT_LOCAL_NAME.to_string(),
            scan_request_reporting: false,
            duty_cycle: DutyCycle::default(),
        }
    }

    pub fn major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn minor(mut self, minor: u16) -> Self {
        self.minor = minor;
        self
    }

    pub fn interval_ms(mut self, interval_ms: u16) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    pub fn local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = name.into();
        self
    }

    pub fn scan_request_reporting(mut self, enabled: bool) -> Self {
        self.scan_request_reporting = enabled;
        self
    }

    pub fn duty_cycle(mut self, duty_cycle: DutyCycle) -> Self {
        self.duty_cycle = duty_cycle;
        self
    }

    /// Validate and freeze the parameters
    pub fn build(self) -> Result<BeaconParameters, ValidationError> {
        let uuid: [u8; 16] = self
            .uuid
            .as_slice()
            .try_into()
            .map_err(|_| ValidationError::UuidLength(self.uuid.len()))?;

        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(ValidationError::IntervalOutOfRange(self.interval_ms));
        }

        // Same checks the scan response builder applies, done up front
        build_scan_response_block(&self.local_name)?;

        Ok(BeaconParameters {
            uuid,
            major: self.major,
            minor: self.minor,
            interval_ms: self.interval_ms,
            measured_power: MEASURED_POWER,
            local_name: self.local_name,
            scan_request_reporting: self.scan_request_reporting,
            duty_cycle: self.duty_cycle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bgapi::constants::{ADV_INTERVAL_MAX_TICKS, ADV_INTERVAL_MIN_TICKS};

    #[test]
    fn test_defaults() {
        let params = BeaconParameters::builder([0u8; 16]).build().unwrap();

        assert_eq!(params.major(), 1);
        assert_eq!(params.minor(), 1);
        assert_eq!(params.interval_ms(), 100);
        assert_eq!(params.measured_power(), -58);
        assert_eq!(params.measured_power() as u8, 0xC6);
        assert_eq!(params.local_name(), "MOB-1443");
        assert!(!params.scan_request_reporting());
        assert_eq!(params.duty_cycle(), DutyCycle::default());
    }

    #[test]
    fn test_uuid_length_is_checked() {
        let err = BeaconParameters::builder([0u8; 15]).build().unwrap_err();
        assert_eq!(err, ValidationError::UuidLength(15));

        let err = BeaconParameters::builder(Vec::<u8>::new()).build().unwrap_err();
        assert_eq!(err, ValidationError::UuidLength(0));
    }

    #[test]
    fn test_interval_range() {
        for interval in [MIN_INTERVAL_MS, 100, 1000, MAX_INTERVAL_MS] {
            assert!(BeaconParameters::builder([0u8; 16])
                .interval_ms(interval)
                .build()
                .is_ok());
        }

        for interval in [0, 29, 10231, u16::MAX] {
            let err = BeaconParameters::builder([0u8; 16])
                .interval_ms(interval)
                .build()
                .unwrap_err();
            assert_eq!(err, ValidationError::IntervalOutOfRange(interval));
        }
    }

    #[test]
    fn test_interval_ticks_stay_in_radio_range() {
        for interval in MIN_INTERVAL_MS..=MAX_INTERVAL_MS {
            let params = BeaconParameters::builder([0u8; 16])
                .interval_ms(interval)
                .build()
                .unwrap();

            let min = params.adv_interval_min_ticks();
            let max = params.adv_interval_max_ticks();

            assert!(min >= ADV_INTERVAL_MIN_TICKS);
            assert!(max <= ADV_INTERVAL_MAX_TICKS);
            assert!(min < max);

            // Converting back lands within a tick of the requested window
            assert!(interval - INTERVAL_WINDOW_MS - ticks_to_ms(min) <= 1);
            assert!(interval + INTERVAL_WINDOW_MS - ticks_to_ms(max) <= 1);
        }
    }

    #[test]
    fn test_interval_tick_edges() {
        assert_eq!(ms_to_ticks(20), 32);
        assert_eq!(ms_to_ticks(90), 144);
        assert_eq!(ms_to_ticks(110), 176);
        assert_eq!(ms_to_ticks(10240), 16384);
        assert_eq!(ms_to_ticks(21), 33);
    }

    #[test]
    fn test_local_name_is_checked() {
        let err = BeaconParameters::builder([0u8; 16])
            .local_name("x".repeat(30))
            .build()
            .unwrap_err();
        assert_eq!(err, ValidationError::LocalNameTooLong { len: 30, max: 29 });
    }

    #[test]
    fn test_duty_cycle() {
        let cycle = DutyCycle::new(Duration::from_secs(45), Duration::from_secs(360)).unwrap();
        assert_eq!(cycle.idle_time(), Duration::from_secs(315));
        assert!(!cycle.is_run_once());

        let cycle = DutyCycle::new(Duration::from_secs(400), Duration::from_secs(360)).unwrap();
        assert_eq!(cycle.idle_time(), Duration::ZERO);

        assert!(DutyCycle::new(Duration::ZERO, Duration::from_secs(10)).is_err());
        assert!(DutyCycle::new(Duration::from_secs(10), Duration::ZERO).is_err());

        assert!(DutyCycle::run_once().is_run_once());
    }
}
