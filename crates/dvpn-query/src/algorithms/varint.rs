//! # Unsigned Varint
//!
//! LEB128 length prefixes: 7 bits per byte, high bit set on all but the last.

use crate::domain::DecodeError;

/// A `u64` never needs more than 10 bytes.
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` as an unsigned varint.
pub fn encode_uvarint(mut value: u64, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push((value as u8) | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Read an unsigned varint from the front of `input`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_uvarint(input: &[u8]) -> Result<(u64, usize), DecodeError> {
    let mut value: u64 = 0;

    for (i, &byte) in input.iter().enumerate() {
        if i == MAX_VARINT_LEN {
            return Err(DecodeError::PrefixOverflow);
        }

        let bits = u64::from(byte & 0x7f);
        // The tenth byte may only contribute the top bit of a u64.
        if i == MAX_VARINT_LEN - 1 && bits > 1 {
            return Err(DecodeError::PrefixOverflow);
        }
        value |= bits << (7 * i);

        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }

    if input.is_empty() {
        Err(DecodeError::Empty)
    } else {
        Err(DecodeError::TruncatedPrefix)
    }
}
