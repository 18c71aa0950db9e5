//! Unit tests for response line rendering.
use super::*;
use crate::protocol::transport::can_id::CanId;

fn response_11bit() -> CanFrame {
    CanFrame::new(
        CanId(0x7E8),
        false,
        &[0x06, 0x41, 0x00, 0xBE, 0x3F, 0xA8, 0x13, 0x00],
    )
}

const PAYLOAD: [u8; 6] = [0x41, 0x00, 0xBE, 0x3F, 0xA8, 0x13];

#[test]
/// Default display: payload only, spaced.
fn test_payload_only() {
    let line = format_frame(&response_11bit(), &PAYLOAD, LineFormat::from(&ElmConfig::default()));
    assert_eq!(line.unwrap().as_str(), "41 00 BE 3F A8 13\r");
}

#[test]
fn test_header_with_spaces() {
    let format = LineFormat {
        show_header: true,
        spaces: true,
        ..LineFormat::default()
    };
    let line = format_frame(&response_11bit(), &PAYLOAD, format).unwrap();
    assert_eq!(line.as_str(), "7E8 06 41 00 BE 3F A8 13\r");
}

#[test]
fn test_header_dlc_without_spaces() {
    let format = LineFormat {
        show_header: true,
        display_dlc: true,
        spaces: false,
    };
    let line = format_frame(&response_11bit(), &PAYLOAD, format).unwrap();
    assert_eq!(line.as_str(), "7E88064100BE3FA813\r");
}

#[test]
/// 29-bit identifiers are printed on eight digits.
fn test_extended_header() {
    let frame = CanFrame::new(
        CanId(0x18DA_F110),
        true,
        &[0x10, 0x14, 0x49, 0x02, 0x01, 0x31, 0x44, 0x34],
    );
    let format = LineFormat {
        show_header: true,
        spaces: true,
        ..LineFormat::default()
    };
    let line = format_frame(&frame, &frame.data[1..8], format).unwrap();
    assert_eq!(line.as_str(), "18DAF110 10 14 49 02 01 31 44 34\r");
}

#[test]
fn test_empty_payload() {
    let frame = CanFrame::new(CanId(0x7E8), false, &[0x00]);
    let line = format_frame(&frame, &[], LineFormat::default()).unwrap();
    assert_eq!(line.as_str(), "\r");
}
