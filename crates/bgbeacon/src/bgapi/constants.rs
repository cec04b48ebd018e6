//! BGAPI protocol constants
//!
//! This module contains constants used in the Bluegiga BGAPI binary protocol.

// Message type byte (first header byte) for a Bluetooth Smart command
pub const BGAPI_MSG_COMMAND: u8 = 0x00;

// Header is message type, payload length, class, id
pub const BGAPI_HEADER_LEN: usize = 4;

// Command classes
pub const CLASS_SYSTEM: u8 = 0x00;
pub const CLASS_CONNECTION: u8 = 0x03;
pub const CLASS_GAP: u8 = 0x06;

// System class (0x00)
pub const CMD_SYSTEM_RESET: u8 = 0x00;

// Connection class (0x03)
pub const CMD_CONNECTION_DISCONNECT: u8 = 0x00;

// GAP class (0x06)
pub const CMD_GAP_SET_MODE: u8 = 0x01;
pub const CMD_GAP_END_PROCEDURE: u8 = 0x04;
pub const CMD_GAP_SET_ADV_PARAMETERS: u8 = 0x08;
pub const CMD_GAP_SET_ADV_DATA: u8 = 0x09;

// Response lengths (header included)
pub const RSP_LEN_CONNECTION_DISCONNECT: usize = 7;
pub const RSP_LEN_GAP_SET_MODE: usize = 6;
pub const RSP_LEN_GAP_END_PROCEDURE: usize = 6;
pub const RSP_LEN_GAP_SET_ADV_PARAMETERS: usize = 6;
pub const RSP_LEN_GAP_SET_ADV_DATA: usize = 6;

// gap_set_adv_data set selector
pub const ADV_DATA_SET_ADVERTISEMENT: u8 = 0x00;
pub const ADV_DATA_SET_SCAN_RESPONSE: u8 = 0x01;

// Advertising and scan response payloads are capped by the link layer
pub const MAX_ADV_DATA_LEN: usize = 31;

// Advertising interval limits, in 0.625 ms ticks
pub const ADV_INTERVAL_MIN_TICKS: u16 = 0x0020; // 20 ms
pub const ADV_INTERVAL_MAX_TICKS: u16 = 0x4000; // 10.24 s
