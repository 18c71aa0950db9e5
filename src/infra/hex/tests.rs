//! Unit tests for hex parsing and rendering.
use super::*;

#[test]
fn test_parse_u32() {
    assert_eq!(parse_u32("7e0"), Ok(0x7E0));
    assert_eq!(parse_u32("18DB33F1"), Ok(0x18DB_33F1));
    assert_eq!(parse_u32(""), Err(HexError::InvalidLength { len: 0 }));
    assert_eq!(
        parse_u32("123456789"),
        Err(HexError::InvalidLength { len: 9 })
    );
    assert_eq!(parse_u32("7x0"), Err(HexError::InvalidDigit { digit: 'x' }));
    assert_eq!(parse_u32("aBc"), Ok(0xABC));
}

#[test]
fn test_parse_fixed_width() {
    assert_eq!(parse_fixed("32", 2), Ok(0x32));
    assert_eq!(parse_fixed("3", 2), Err(HexError::InvalidLength { len: 1 }));
}

#[test]
/// Byte strings must be even and fit the destination.
fn test_parse_bytes() {
    let mut out = [0u8; 5];
    assert_eq!(parse_bytes("300000", &mut out), Ok(3));
    assert_eq!(&out[..3], &[0x30, 0x00, 0x00]);

    assert_eq!(
        parse_bytes("300", &mut out),
        Err(HexError::InvalidLength { len: 3 })
    );
    assert_eq!(
        parse_bytes("010203040506", &mut out),
        Err(HexError::InvalidLength { len: 12 })
    );
    assert_eq!(
        parse_bytes("0z", &mut out),
        Err(HexError::InvalidDigit { digit: 'z' })
    );
    assert_eq!(parse_bytes("", &mut out), Ok(0));
}

#[test]
fn test_push_hex_padding_and_case() {
    let mut text: heapless::String<16> = heapless::String::new();
    push_hex(&mut text, 0x7e8, 3).unwrap();
    push_hex(&mut text, 0x6, 2).unwrap();
    assert_eq!(text.as_str(), "7E806");

    let mut tiny: heapless::String<2> = heapless::String::new();
    assert_eq!(
        push_hex(&mut tiny, 0x18DA_F110, 8),
        Err(BufferError::Full { capacity: 2 })
    );
}
