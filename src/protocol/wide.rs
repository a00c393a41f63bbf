//! Wide integer and float field encoding.
//!
//! The daemon transmits 64-bit values as two big-endian 32-bit words, high
//! word first, and floats as the raw IEEE-754 bit pattern in a big-endian
//! 32-bit word.

/// Encodes an unsigned 64-bit value as `hi:u32 BE` followed by `lo:u32 BE`.
pub fn encode_u64(v: u64) -> [u8; 8] {
    let hi = (v >> 32) as u32;
    let lo = (v & 0xFFFF_FFFF) as u32;

    let mut out = [0; 8];
    out[..4].copy_from_slice(&hi.to_be_bytes());
    out[4..].copy_from_slice(&lo.to_be_bytes());
    out
}

pub fn encode_i64(v: i64) -> [u8; 8] {
    encode_u64(v as u64)
}

pub fn decode_u64(bytes: &[u8; 8]) -> u64 {
    let hi = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u64;
    let lo = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as u64;
    (hi << 32) | lo
}

pub fn decode_i64(bytes: &[u8; 8]) -> i64 {
    decode_u64(bytes) as i64
}

/// Encodes the bit pattern of `v`. NaN payloads and signed zero survive.
pub fn encode_f32_bits(v: f32) -> [u8; 4] {
    v.to_bits().to_be_bytes()
}

pub fn decode_f32_bits(bytes: &[u8; 4]) -> f32 {
    f32::from_bits(u32::from_be_bytes(*bytes))
}

/// Reinterprets a signed 32-bit slot holding an unsigned wire value.
pub fn fix_unsigned_32(v: i32) -> u32 {
    v as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_boundaries() {
        for v in [0, 1, -1, 42, i64::MIN, i64::MAX, i32::MIN as i64, u32::MAX as i64] {
            assert_eq!(decode_i64(&encode_i64(v)), v);
        }
    }

    #[test]
    fn unsigned_boundaries() {
        for v in [0, 1, u32::MAX as u64, u32::MAX as u64 + 1, u64::MAX] {
            assert_eq!(decode_u64(&encode_u64(v)), v);
        }
    }

    #[test]
    fn high_word_first() {
        assert_eq!(
            encode_u64(0x0102_0304_0506_0708),
            [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]
        );
        assert_eq!(encode_i64(-1), [0xFF; 8]);
        assert_eq!(encode_i64(i64::MIN), [0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn float_bits_are_preserved() {
        let nan_payload = f32::from_bits(0x7FC0_1234);
        let subnormal = f32::from_bits(0x0000_0001);
        for v in [0.0f32, -0.0, 1.5, f32::MIN, f32::INFINITY, nan_payload, subnormal] {
            let back = decode_f32_bits(&encode_f32_bits(v));
            assert_eq!(back.to_bits(), v.to_bits());
        }
    }

    #[test]
    fn float_is_not_a_numeric_cast() {
        assert_eq!(encode_f32_bits(1.0), [0x3F, 0x80, 0x00, 0x00]);
        assert_eq!(encode_f32_bits(-0.0), [0x80, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn unsigned_fix_up() {
        assert_eq!(fix_unsigned_32(-1), u32::MAX);
        assert_eq!(fix_unsigned_32(i32::MIN), 0x8000_0000);
        assert_eq!(fix_unsigned_32(7), 7);
    }
}
