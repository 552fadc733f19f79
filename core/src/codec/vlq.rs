//! Base64 variable-length quantities.
//!
//! A value is folded into sign-magnitude form (sign in bit 0), then emitted in 5-bit
//! groups, least significant first. Bit 5 of every group except the last is the
//! continuation bit. Each 6-bit group maps through the standard base64 alphabet.

use super::cursor::Cursor;
use crate::errors::MappingError;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u128 = (1 << VLQ_BASE_SHIFT) - 1;
const VLQ_CONTINUATION_BIT: u8 = 1 << VLQ_BASE_SHIFT;

// 13 groups carry 65 bits, enough for a folded `i64`.
const MAX_SHIFT: u32 = 60;

fn base64_value(byte: u8) -> Option<u8> {
    match byte {
        b'A'..=b'Z' => Some(byte - b'A'),
        b'a'..=b'z' => Some(byte - b'a' + 26),
        b'0'..=b'9' => Some(byte - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        _ => None,
    }
}

/// Encode one signed value. Zero encodes to `"A"`, never to an empty string.
pub fn encode(value: i64) -> String {
    let mut out = String::new();
    encode_into(value, &mut out);
    out
}

/// Append the encoding of `value` to `out`.
pub fn encode_into(value: i64, out: &mut String) {
    // `i64::MIN` folds to 65 bits.
    let magnitude = u128::from(value.unsigned_abs()) << 1;
    let mut vlq = if value < 0 { magnitude | 1 } else { magnitude };

    loop {
        let mut digit = (vlq & VLQ_BASE_MASK) as u8;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(ALPHABET[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Decode a token holding exactly one value.
pub fn decode(token: &str) -> Result<i64, MappingError> {
    let mut cursor = Cursor::new(token);
    let value = decode_next(&mut cursor)?;
    if !cursor.is_at_end() {
        return Err(MappingError::malformed_vlq(
            "trailing characters after value",
            cursor.offset(),
            token.len() - cursor.pos(),
        ));
    }
    Ok(value)
}

/// Decode every value packed back to back in `token`.
pub fn decode_all(token: &str) -> Result<Vec<i64>, MappingError> {
    decode_all_at(token, 0)
}

/// Like [`decode_all`], reporting error spans relative to `base`.
pub fn decode_all_at(token: &str, base: usize) -> Result<Vec<i64>, MappingError> {
    let mut cursor = Cursor::at(token, base);
    let mut values = Vec::with_capacity(5);
    while !cursor.is_at_end() {
        values.push(decode_next(&mut cursor)?);
    }
    Ok(values)
}

/// Consume one value from the cursor.
pub fn decode_next(cursor: &mut Cursor<'_>) -> Result<i64, MappingError> {
    let start = cursor.offset();
    let mut accumulated: u128 = 0;
    let mut shift = 0;

    loop {
        let Some(byte) = cursor.advance() else {
            return Err(MappingError::malformed_vlq(
                "unexpected end of input inside a value",
                start,
                cursor.offset() - start,
            ));
        };
        let Some(digit) = base64_value(byte) else {
            return Err(MappingError::malformed_vlq(
                "invalid base64 character",
                cursor.offset() - 1,
                1,
            ));
        };
        if shift > MAX_SHIFT {
            return Err(MappingError::malformed_vlq(
                "value does not fit in 64 bits",
                start,
                cursor.offset() - start,
            ));
        }

        accumulated |= (u128::from(digit) & VLQ_BASE_MASK) << shift;
        shift += VLQ_BASE_SHIFT;

        if digit & VLQ_CONTINUATION_BIT == 0 {
            break;
        }
    }

    let magnitude = (accumulated >> 1) as i128;
    let value = if accumulated & 1 == 1 {
        -magnitude
    } else {
        magnitude
    };
    i64::try_from(value).map_err(|_| {
        MappingError::malformed_vlq(
            "value does not fit in 64 bits",
            start,
            cursor.offset() - start,
        )
    })
}
