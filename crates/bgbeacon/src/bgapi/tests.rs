//! Unit tests for BGAPI frame encoding and parsing

use super::constants::*;
use super::packet::*;
use crate::error::ValidationError;

#[test]
fn test_fixed_frames() {
    // System reset: no response expected
    let packet = encode_system_reset(false);
    assert_eq!(packet, vec![0x00, 0x01, 0x00, 0x00, 0x00]);
    assert_eq!(encode_system_reset(true)[4], 0x01);
    assert_eq!(BgapiCommand::SystemReset { boot_in_dfu: false }.response_len(), None);

    // Disconnect connection 0
    let packet = encode_connection_disconnect(0);
    assert_eq!(packet, vec![0x00, 0x01, 0x03, 0x00, 0x00]);

    // Stop advertising
    let packet = encode_gap_set_mode(GAP_NON_DISCOVERABLE, GAP_NON_CONNECTABLE);
    assert_eq!(packet, vec![0x00, 0x02, 0x06, 0x01, 0x00, 0x00]);

    // Start advertising with user data and enhanced broadcasting
    let packet = encode_gap_set_mode(
        GAP_USER_DATA | GAP_ENHANCED_BROADCASTING,
        GAP_SCANNABLE_NON_CONNECTABLE,
    );
    assert_eq!(packet, vec![0x00, 0x02, 0x06, 0x01, 0x84, 0x03]);

    // End procedure has an empty payload
    let packet = encode_gap_end_procedure();
    assert_eq!(packet, vec![0x00, 0x00, 0x06, 0x04]);
}

#[test]
fn test_response_lengths() {
    assert_eq!(
        BgapiCommand::ConnectionDisconnect { connection: 0 }.response_len(),
        Some(7)
    );
    assert_eq!(
        BgapiCommand::GapSetMode {
            discoverable: 0,
            connectable: 0
        }
        .response_len(),
        Some(6)
    );
    assert_eq!(BgapiCommand::GapEndProcedure.response_len(), Some(6));
    assert_eq!(
        BgapiCommand::GapSetAdvParameters {
            interval_min: 0x20,
            interval_max: 0x20,
            channels: AdvChannels::ALL,
        }
        .response_len(),
        Some(6)
    );
    assert_eq!(
        BgapiCommand::set_adv_data(false, &[]).unwrap().response_len(),
        Some(6)
    );
}

#[test]
fn test_set_adv_parameters_little_endian() {
    let packet = encode_gap_set_adv_parameters(0x00A0, 0x0140, AdvChannels::ALL);

    assert_eq!(packet[0], BGAPI_MSG_COMMAND);
    assert_eq!(packet[1], 5);
    assert_eq!(packet[2], CLASS_GAP);
    assert_eq!(packet[3], CMD_GAP_SET_ADV_PARAMETERS);

    assert_eq!(u16::from_le_bytes([packet[4], packet[5]]), 0x00A0);
    assert_eq!(u16::from_le_bytes([packet[6], packet[7]]), 0x0140);
    assert_eq!(packet[8], 0x07);
    assert_eq!(packet.len(), 9);
}

#[test]
fn test_set_adv_data_length_field() {
    for len in [0usize, 1, 10, 30, 31] {
        let data: Vec<u8> = (0..len as u8).collect();
        let packet = encode_gap_set_adv_data(true, &data).unwrap();

        // Length field counts the set selector and length prefix too
        assert_eq!(packet[1] as usize, 2 + len);
        assert_eq!(packet.len(), BGAPI_HEADER_LEN + 2 + len);
        assert_eq!(packet[4], ADV_DATA_SET_SCAN_RESPONSE);
        assert_eq!(packet[5] as usize, len);
        assert_eq!(&packet[6..], data.as_slice());
    }
}

#[test]
fn test_set_adv_data_rejects_oversized() {
    let data = [0u8; 32];
    assert_eq!(
        encode_gap_set_adv_data(false, &data),
        Err(ValidationError::AdvDataTooLong(32))
    );
}

#[test]
fn test_set_adv_data_frame_decodes() {
    let data = vec![0x09, 0x09, 0x4D, 0x4F, 0x42, 0x2D, 0x31, 0x34, 0x34, 0x33];
    let packet = encode_gap_set_adv_data(true, &data).unwrap();

    let frame = CommandFrame::parse(&packet).unwrap();
    assert_eq!(frame.message_type, BGAPI_MSG_COMMAND);
    assert_eq!(frame.payload_len as usize, frame.payload.len());
    assert_eq!((frame.class, frame.id), (CLASS_GAP, CMD_GAP_SET_ADV_DATA));

    match BgapiCommand::from_frame(&frame) {
        Some(BgapiCommand::GapSetAdvData {
            scan_response,
            data: decoded,
        }) => {
            assert!(scan_response);
            assert_eq!(decoded, data);
        }
        other => panic!("unexpected decode: {:?}", other),
    }

    let packet = encode_gap_set_adv_data(false, &data[..3]).unwrap();
    let frame = CommandFrame::parse(&packet).unwrap();
    assert_eq!(
        BgapiCommand::from_frame(&frame),
        Some(BgapiCommand::GapSetAdvData {
            scan_response: false,
            data: data[..3].to_vec(),
        })
    );
}

#[test]
fn test_frame_parsing_rejects_bad_lengths() {
    // Too short for a header
    assert!(CommandFrame::parse(&[0x00, 0x00, 0x06]).is_none());

    // Length field claims more than is present
    assert!(CommandFrame::parse(&[0x00, 0x02, 0x06, 0x01, 0x00]).is_none());

    // Length field claims less than is present
    assert!(CommandFrame::parse(&[0x00, 0x00, 0x06, 0x04, 0x00]).is_none());

    // Unknown class/id parses as a frame but not as a command
    let frame = CommandFrame::parse(&[0x00, 0x00, 0x07, 0x01]).unwrap();
    assert!(BgapiCommand::from_frame(&frame).is_none());
}

#[test]
fn test_commands_decode_from_their_frames() {
    let commands = vec![
        BgapiCommand::SystemReset { boot_in_dfu: true },
        BgapiCommand::ConnectionDisconnect { connection: 0 },
        BgapiCommand::GapSetMode {
            discoverable: 0x84,
            connectable: 0x03,
        },
        BgapiCommand::GapEndProcedure,
        BgapiCommand::GapSetAdvParameters {
            interval_min: 144,
            interval_max: 176,
            channels: AdvChannels::ALL,
        },
    ];

    for command in commands {
        let frame = CommandFrame::parse(&command.to_packet()).unwrap();
        assert_eq!(frame.class_and_id(), command.class_and_id());
        assert_eq!(BgapiCommand::from_frame(&frame), Some(command));
    }
}

#[test]
fn test_adv_channels() {
    assert_eq!(AdvChannels::ALL.bits(), 0x07);
    assert_eq!(
        AdvChannels::CHANNEL_37 | AdvChannels::CHANNEL_39,
        AdvChannels::from_bits_retain(0x05)
    );
}

#[test]
fn test_header_length_byte_matches_payload() {
    let commands = vec![
        BgapiCommand::GapEndProcedure,
        BgapiCommand::GapSetAdvParameters {
            interval_min: ADV_INTERVAL_MIN_TICKS,
            interval_max: ADV_INTERVAL_MAX_TICKS,
            channels: AdvChannels::ALL,
        },
        BgapiCommand::set_adv_data(true, &[0xAA; MAX_ADV_DATA_LEN]).unwrap(),
    ];

    for command in commands {
        let packet = command.to_packet();
        assert_eq!(usize::from(packet[1]), packet.len() - BGAPI_HEADER_LEN);
    }
}
