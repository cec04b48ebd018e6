//! iBeacon advertising payloads
//!
//! This module builds the advertisement and scan response blocks the radio
//! broadcasts. Both are sequences of AD elements, each encoded as a length
//! byte (type + value), a type byte and the value.

use crate::beacon::BeaconParameters;
use crate::bgapi::constants::MAX_ADV_DATA_LEN;
use crate::error::ValidationError;

// Advertising Data Types
pub const ADV_TYPE_FLAGS: u8 = 0x01;
pub const ADV_TYPE_COMPLETE_LOCAL_NAME: u8 = 0x09;
pub const ADV_TYPE_MANUFACTURER_SPECIFIC: u8 = 0xFF;

// Flags: LE General Discoverable Mode, BR/EDR Not Supported
pub const ADV_FLAGS_GENERAL_DISC_NO_BREDR: u8 = 0x06;

// Apple company identifier, little-endian on air
pub const APPLE_COMPANY_ID: u16 = 0x004C;

// iBeacon subtype and the length of what follows it
pub const IBEACON_TYPE: u8 = 0x02;
pub const IBEACON_DATA_LEN: u8 = 0x15;

/// Size of the complete iBeacon advertisement block
pub const IBEACON_BLOCK_LEN: usize = 30;

/// Longest local name that fits in one scan response element
pub const MAX_LOCAL_NAME_LEN: usize = MAX_ADV_DATA_LEN - 2;

const IBEACON_UUID_OFFSET: usize = 9;
const IBEACON_MAJOR_OFFSET: usize = 25;
const IBEACON_MINOR_OFFSET: usize = 27;
const IBEACON_POWER_OFFSET: usize = 29;

/// Fixed leading bytes of every iBeacon advertisement: flags element, then
/// the manufacturer element header up to the UUID.
pub const IBEACON_PREFIX: [u8; IBEACON_UUID_OFFSET] = [
    0x02,
    ADV_TYPE_FLAGS,
    ADV_FLAGS_GENERAL_DISC_NO_BREDR,
    0x1A,
    ADV_TYPE_MANUFACTURER_SPECIFIC,
    (APPLE_COMPANY_ID & 0xFF) as u8,
    (APPLE_COMPANY_ID >> 8) as u8,
    IBEACON_TYPE,
    IBEACON_DATA_LEN,
];

fn ibeacon_block(
    uuid: &[u8; 16],
    major: u16,
    minor: u16,
    measured_power: i8,
) -> [u8; IBEACON_BLOCK_LEN] {
    let mut block = [0u8; IBEACON_BLOCK_LEN];
    block[..IBEACON_UUID_OFFSET].copy_from_slice(&IBEACON_PREFIX);
    block[IBEACON_UUID_OFFSET..IBEACON_MAJOR_OFFSET].copy_from_slice(uuid);
    block[IBEACON_MAJOR_OFFSET..IBEACON_MINOR_OFFSET].copy_from_slice(&major.to_le_bytes());
    block[IBEACON_MINOR_OFFSET..IBEACON_POWER_OFFSET].copy_from_slice(&minor.to_le_bytes());
    block[IBEACON_POWER_OFFSET] = measured_power as u8;
    block
}

/// Build an iBeacon advertisement block from raw fields
///
/// The UUID bytes are copied in the order given. Major and minor are
/// written little-endian.
pub fn build_ibeacon_block(
    uuid: &[u8],
    major: u16,
    minor: u16,
    measured_power: i8,
) -> Result<[u8; IBEACON_BLOCK_LEN], ValidationError> {
    let uuid: &[u8; 16] = uuid
        .try_into()
        .map_err(|_| ValidationError::UuidLength(uuid.len()))?;
    Ok(ibeacon_block(uuid, major, minor, measured_power))
}

/// Build the primary advertisement block for a beacon
pub fn build_primary_advertising_block(params: &BeaconParameters) -> [u8; IBEACON_BLOCK_LEN] {
    ibeacon_block(
        params.uuid(),
        params.major(),
        params.minor(),
        params.measured_power(),
    )
}

/// Build the scan response block carrying the local name
///
/// Names longer than [`MAX_LOCAL_NAME_LEN`] are rejected, never truncated.
pub fn build_scan_response_block(local_name: &str) -> Result<Vec<u8>, ValidationError> {
    if !local_name.is_ascii() {
        return Err(ValidationError::LocalNameNotAscii);
    }
    let name = local_name.as_bytes();
    if name.len() > MAX_LOCAL_NAME_LEN {
        return Err(ValidationError::LocalNameTooLong {
            len: name.len(),
            max: MAX_LOCAL_NAME_LEN,
        });
    }

    let mut block = Vec::with_capacity(2 + name.len());
    block.push(1 + name.len() as u8);
    block.push(ADV_TYPE_COMPLETE_LOCAL_NAME);
    block.extend_from_slice(name);
    Ok(block)
}

/// The two payloads loaded into the radio before advertising
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvertisingDataSet {
    pub advertisement: Vec<u8>,
    pub scan_response: Vec<u8>,
}

impl AdvertisingDataSet {
    pub fn for_beacon(params: &BeaconParameters) -> Result<Self, ValidationError> {
        Ok(Self {
            advertisement: build_primary_advertising_block(params).to_vec(),
            scan_response: build_scan_response_block(params.local_name())?,
        })
    }
}
