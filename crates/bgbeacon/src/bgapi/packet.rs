//! BGAPI command frame structures and encoding
//!
//! This module contains the commands this library sends to the radio module
//! and the byte-exact frames they encode to.

use crate::bgapi::constants::*;
use crate::error::ValidationError;
use bitflags::bitflags;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

// gap_set_mode discoverable values
pub const GAP_NON_DISCOVERABLE: u8 = 0x00;
pub const GAP_USER_DATA: u8 = 0x04;
pub const GAP_ENHANCED_BROADCASTING: u8 = 0x80;

// gap_set_mode connectable values
pub const GAP_NON_CONNECTABLE: u8 = 0x00;
pub const GAP_SCANNABLE_NON_CONNECTABLE: u8 = 0x03;

bitflags! {
    /// Advertising channels enabled by gap_set_adv_parameters
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AdvChannels: u8 {
        const CHANNEL_37 = 0x01;
        const CHANNEL_38 = 0x02;
        const CHANNEL_39 = 0x04;
        const ALL = Self::CHANNEL_37.bits() | Self::CHANNEL_38.bits() | Self::CHANNEL_39.bits();
    }
}

/// Commands understood by this library
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BgapiCommand {
    // System class
    SystemReset { boot_in_dfu: bool },

    // Connection class
    ConnectionDisconnect { connection: u8 },

    // GAP class
    GapSetMode { discoverable: u8, connectable: u8 },
    GapEndProcedure,
    GapSetAdvParameters {
        interval_min: u16,
        interval_max: u16,
        channels: AdvChannels,
    },
    GapSetAdvData { scan_response: bool, data: Vec<u8> },
}

impl BgapiCommand {
    /// Build a gap_set_adv_data command, rejecting payloads over 31 bytes
    pub fn set_adv_data(scan_response: bool, data: &[u8]) -> Result<Self, ValidationError> {
        if data.len() > MAX_ADV_DATA_LEN {
            return Err(ValidationError::AdvDataTooLong(data.len()));
        }
        Ok(Self::GapSetAdvData {
            scan_response,
            data: data.to_vec(),
        })
    }

    /// Get the command class and id for this command
    pub fn class_and_id(&self) -> (u8, u8) {
        match self {
            Self::SystemReset { .. } => (CLASS_SYSTEM, CMD_SYSTEM_RESET),
            Self::ConnectionDisconnect { .. } => (CLASS_CONNECTION, CMD_CONNECTION_DISCONNECT),
            Self::GapSetMode { .. } => (CLASS_GAP, CMD_GAP_SET_MODE),
            Self::GapEndProcedure => (CLASS_GAP, CMD_GAP_END_PROCEDURE),
            Self::GapSetAdvParameters { .. } => (CLASS_GAP, CMD_GAP_SET_ADV_PARAMETERS),
            Self::GapSetAdvData { .. } => (CLASS_GAP, CMD_GAP_SET_ADV_DATA),
        }
    }

    /// Short name used in logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::SystemReset { .. } => "system_reset",
            Self::ConnectionDisconnect { .. } => "connection_disconnect",
            Self::GapSetMode { .. } => "gap_set_mode",
            Self::GapEndProcedure => "gap_end_procedure",
            Self::GapSetAdvParameters { .. } => "gap_set_adv_parameters",
            Self::GapSetAdvData { .. } => "gap_set_adv_data",
        }
    }

    /// Number of response bytes the caller must consume after sending.
    ///
    /// `None` means the radio reboots instead of answering.
    pub fn response_len(&self) -> Option<usize> {
        match self {
            Self::SystemReset { .. } => None,
            Self::ConnectionDisconnect { .. } => Some(RSP_LEN_CONNECTION_DISCONNECT),
            Self::GapSetMode { .. } => Some(RSP_LEN_GAP_SET_MODE),
            Self::GapEndProcedure => Some(RSP_LEN_GAP_END_PROCEDURE),
            Self::GapSetAdvParameters { .. } => Some(RSP_LEN_GAP_SET_ADV_PARAMETERS),
            Self::GapSetAdvData { .. } => Some(RSP_LEN_GAP_SET_ADV_DATA),
        }
    }

    /// Convert the command to its raw payload bytes
    fn parameters(&self) -> Vec<u8> {
        match self {
            Self::GapEndProcedure => vec![],

            Self::SystemReset { boot_in_dfu } => vec![*boot_in_dfu as u8],

            Self::ConnectionDisconnect { connection } => vec![*connection],

            Self::GapSetMode {
                discoverable,
                connectable,
            } => vec![*discoverable, *connectable],

            Self::GapSetAdvParameters {
                interval_min,
                interval_max,
                channels,
            } => {
                let mut params = Vec::with_capacity(5);
                params.extend_from_slice(&interval_min.to_le_bytes());
                params.extend_from_slice(&interval_max.to_le_bytes());
                params.push(channels.bits());
                params
            }

            Self::GapSetAdvData {
                scan_response,
                data,
            } => {
                let mut params = Vec::with_capacity(2 + data.len());
                params.push(if *scan_response {
                    ADV_DATA_SET_SCAN_RESPONSE
                } else {
                    ADV_DATA_SET_ADVERTISEMENT
                });
                params.push(data.len() as u8);
                params.extend_from_slice(data);
                params
            }
        }
    }

    /// Convert the command to a raw BGAPI frame
    pub fn to_packet(&self) -> Vec<u8> {
        let (class, id) = self.class_and_id();
        let params = self.parameters();

        let mut packet = Vec::with_capacity(BGAPI_HEADER_LEN + params.len());
        packet.push(BGAPI_MSG_COMMAND);
        packet.push(params.len() as u8);
        packet.push(class);
        packet.push(id);
        packet.extend_from_slice(&params);
        packet
    }

    /// Recover a typed command from a parsed frame
    pub fn from_frame(frame: &CommandFrame) -> Option<Self> {
        let mut cursor = Cursor::new(frame.payload.as_slice());
        let command = match (frame.class, frame.id) {
            (CLASS_SYSTEM, CMD_SYSTEM_RESET) => Self::SystemReset {
                boot_in_dfu: cursor.read_u8().ok()? != 0,
            },
            (CLASS_CONNECTION, CMD_CONNECTION_DISCONNECT) => Self::ConnectionDisconnect {
                connection: cursor.read_u8().ok()?,
            },
            (CLASS_GAP, CMD_GAP_SET_MODE) => Self::GapSetMode {
                discoverable: cursor.read_u8().ok()?,
                connectable: cursor.read_u8().ok()?,
            },
            (CLASS_GAP, CMD_GAP_END_PROCEDURE) => Self::GapEndProcedure,
            (CLASS_GAP, CMD_GAP_SET_ADV_PARAMETERS) => Self::GapSetAdvParameters {
                interval_min: cursor.read_u16::<LittleEndian>().ok()?,
                interval_max: cursor.read_u16::<LittleEndian>().ok()?,
                channels: AdvChannels::from_bits_retain(cursor.read_u8().ok()?),
            },
            (CLASS_GAP, CMD_GAP_SET_ADV_DATA) => {
                let set = cursor.read_u8().ok()?;
                let len = cursor.read_u8().ok()? as usize;
                let start = cursor.position() as usize;
                let data = frame.payload.get(start..start + len)?.to_vec();
                cursor.set_position((start + len) as u64);
                Self::GapSetAdvData {
                    scan_response: set == ADV_DATA_SET_SCAN_RESPONSE,
                    data,
                }
            }
            _ => return None,
        };

        // Trailing bytes mean the frame is not one we produced
        if cursor.position() as usize != frame.payload.len() {
            return None;
        }
        Some(command)
    }
}

/// A decoded BGAPI frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub message_type: u8,
    pub payload_len: u8,
    pub class: u8,
    pub id: u8,
    pub payload: Vec<u8>,
}

impl CommandFrame {
    /// Parse a frame from raw bytes
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < BGAPI_HEADER_LEN {
            return None;
        }

        let payload_len = data[1];
        let end = BGAPI_HEADER_LEN + payload_len as usize;
        if data.len() != end {
            return None;
        }

        Some(CommandFrame {
            message_type: data[0],
            payload_len,
            class: data[2],
            id: data[3],
            payload: data[BGAPI_HEADER_LEN..end].to_vec(),
        })
    }

    pub fn class_and_id(&self) -> (u8, u8) {
        (self.class, self.id)
    }
}

/// Encode system_reset. The radio reboots and sends no response.
pub fn encode_system_reset(boot_in_dfu: bool) -> Vec<u8> {
    BgapiCommand::SystemReset { boot_in_dfu }.to_packet()
}

/// Encode connection_disconnect (7-byte response)
pub fn encode_connection_disconnect(connection: u8) -> Vec<u8> {
    BgapiCommand::ConnectionDisconnect { connection }.to_packet()
}

/// Encode gap_set_mode (6-byte response)
pub fn encode_gap_set_mode(discoverable: u8, connectable: u8) -> Vec<u8> {
    BgapiCommand::GapSetMode {
        discoverable,
        connectable,
    }
    .to_packet()
}

/// Encode gap_end_procedure (6-byte response)
pub fn encode_gap_end_procedure() -> Vec<u8> {
    BgapiCommand::GapEndProcedure.to_packet()
}

/// Encode gap_set_adv_parameters (6-byte response)
pub fn encode_gap_set_adv_parameters(
    interval_min: u16,
    interval_max: u16,
    channels: AdvChannels,
) -> Vec<u8> {
    BgapiCommand::GapSetAdvParameters {
        interval_min,
        interval_max,
        channels,
    }
    .to_packet()
}

/// Encode gap_set_adv_data (6-byte response)
pub fn encode_gap_set_adv_data(
    scan_response: bool,
    data: &[u8],
) -> Result<Vec<u8>, ValidationError> {
    Ok(BgapiCommand::set_adv_data(scan_response, data)?.to_packet())
}
