//! Byte-level primitives: variable-length quantities, big-endian integers and
//! note durations

use crate::error::{Error, Result};

/// Largest value a 4-byte variable-length quantity can carry
pub const MAX_VLQ: u32 = 0x0FFF_FFFF;

/// Longest legal variable-length quantity in bytes
pub const MAX_VLQ_LEN: usize = 4;

const CONTINUATION: u8 = 0x80;
const GROUP_MASK: u32 = 0x7F;

/// Encode a value as a MIDI variable-length quantity
///
/// The most significant 7-bit group comes first and every group but the last
/// carries the continuation bit. Zero encodes as a single `0x00` byte.
pub fn encode_vlq(value: u32) -> Vec<u8> {
    debug_assert!(
        value <= MAX_VLQ,
        "{value:#x} does not fit in a variable-length quantity"
    );

    let mut bytes = vec![(value & GROUP_MASK) as u8];
    let mut rest = value >> 7;
    while rest > 0 {
        bytes.push((rest & GROUP_MASK) as u8 | CONTINUATION);
        rest >>= 7;
    }
    bytes.reverse();
    bytes
}

/// Decode a variable-length quantity from the front of `bytes`
///
/// Stops at the first byte without the continuation bit; trailing bytes are
/// ignored.
pub fn decode_vlq(bytes: &[u8]) -> u32 {
    let mut value = 0u32;
    for &byte in bytes {
        value = (value << 7) | (byte as u32 & GROUP_MASK);
        if byte & CONTINUATION == 0 {
            break;
        }
    }
    value
}

/// Read a variable-length quantity at `*pos`, advancing past it
pub fn read_vlq(data: &[u8], pos: &mut usize) -> Result<u32> {
    let mut value = 0u32;
    for _ in 0..MAX_VLQ_LEN {
        let byte = *data
            .get(*pos)
            .ok_or_else(|| Error::MidiParse("Truncated variable-length quantity".into()))?;
        *pos += 1;
        value = (value << 7) | (byte as u32 & GROUP_MASK);
        if byte & CONTINUATION == 0 {
            return Ok(value);
        }
    }
    Err(Error::MidiParse(format!(
        "Variable-length quantity longer than {} bytes at offset {}",
        MAX_VLQ_LEN,
        *pos - MAX_VLQ_LEN
    )))
}

/// Big-endian 32-bit encoding
pub fn be_bytes_u32(value: u32) -> [u8; 4] {
    value.to_be_bytes()
}

/// Big-endian 16-bit encoding (the low half of the 32-bit form)
pub fn be_bytes_u16(value: u16) -> [u8; 2] {
    let wide = be_bytes_u32(u32::from(value));
    [wide[2], wide[3]]
}

/// Length in ticks of a note value
///
/// - `note_value`: 1 = whole, 2 = half, 4 = quarter, 8 = eighth and so on.
///   0 yields a zero-length duration.
/// - `dotted`: lengthen by half
/// - `ticks_per_quarter`: the header division
pub fn duration_ticks(note_value: u32, dotted: bool, ticks_per_quarter: u16) -> u32 {
    if note_value == 0 {
        return 0;
    }
    let dots = if dotted { 3 } else { 2 };
    u32::from(ticks_per_quarter) * 4 * dots / 2 / note_value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vlq_known_encodings() {
        assert_eq!(encode_vlq(0), vec![0x00]);
        assert_eq!(encode_vlq(0x40), vec![0x40]);
        assert_eq!(encode_vlq(0x7F), vec![0x7F]);
        assert_eq!(encode_vlq(0x80), vec![0x81, 0x00]);
        assert_eq!(encode_vlq(0x2000), vec![0xC0, 0x00]);
        assert_eq!(encode_vlq(0x3FFF), vec![0xFF, 0x7F]);
        assert_eq!(encode_vlq(0x4000), vec![0x81, 0x80, 0x00]);
        assert_eq!(encode_vlq(0x0010_0000), vec![0xC0, 0x80, 0x00]);
        assert_eq!(encode_vlq(MAX_VLQ), vec![0xFF, 0xFF, 0xFF, 0x7F]);
    }

    #[test]
    fn test_vlq_round_trip_boundaries() {
        let mut values = vec![0, 1, 96, 127, 128, 16383, 16384, 2_097_151, 2_097_152, MAX_VLQ];
        // A spread of values that exercise every group length
        values.extend((0..28).map(|shift| (1u32 << shift) | 0x55));
        for value in values.into_iter().filter(|v| *v <= MAX_VLQ) {
            let encoded = encode_vlq(value);
            assert_eq!(decode_vlq(&encoded), value, "round trip of {value:#x}");
            let mut pos = 0;
            assert_eq!(read_vlq(&encoded, &mut pos).unwrap(), value);
            assert_eq!(pos, encoded.len());
        }
    }

    #[test]
    fn test_vlq_is_minimal() {
        for value in [1u32, 0x80, 0x4000, 0x20_0000, MAX_VLQ] {
            let encoded = encode_vlq(value);
            assert_ne!(encoded[0], 0x80, "redundant leading group for {value:#x}");
            assert!(encoded.len() <= MAX_VLQ_LEN);
            assert_eq!(encoded.last().unwrap() & 0x80, 0);
        }
    }

    #[test]
    fn test_decode_ignores_trailing_bytes() {
        assert_eq!(decode_vlq(&[0x81, 0x00, 0x90, 0x3C]), 0x80);
    }

    #[test]
    fn test_read_vlq_errors() {
        let mut pos = 0;
        assert!(read_vlq(&[0x81, 0x80], &mut pos).is_err());
        let mut pos = 0;
        assert!(read_vlq(&[0xFF, 0xFF, 0xFF, 0xFF, 0x7F], &mut pos).is_err());
    }

    #[test]
    fn test_be_bytes() {
        assert_eq!(be_bytes_u32(6), [0x00, 0x00, 0x00, 0x06]);
        assert_eq!(be_bytes_u32(0x0007_A120), [0x00, 0x07, 0xA1, 0x20]);
        assert_eq!(be_bytes_u16(0x60), [0x00, 0x60]);
        assert_eq!(be_bytes_u16(0x1234), [0x12, 0x34]);
    }

    #[test]
    fn test_duration_ticks() {
        assert_eq!(duration_ticks(0, false, 96), 0);
        assert_eq!(duration_ticks(0, true, 96), 0);
        assert_eq!(duration_ticks(1, false, 96), 384);
        assert_eq!(duration_ticks(4, false, 96), 96);
        assert_eq!(duration_ticks(8, false, 96), 48);
        assert_eq!(duration_ticks(4, true, 96), 144);
        assert_eq!(duration_ticks(8, true, 96), 72);
    }

    #[test]
    fn test_duration_truncates() {
        // 96 * 4 * 2 / 2 / 7 = 54.857...
        assert_eq!(duration_ticks(7, false, 96), 54);
        assert_eq!(duration_ticks(3, false, 0x18), 32);
    }
}
