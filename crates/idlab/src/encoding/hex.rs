use crate::encoding::EncodingError;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Writes the two lower-case hex digits of every input byte into `out`.
///
/// `out` must be exactly twice as long as `input`.
pub fn encode_hex(input: &[u8], out: &mut [u8]) {
    debug_assert_eq!(out.len(), input.len() * 2);
    for (pair, &b) in out.chunks_exact_mut(2).zip(input) {
        pair[0] = HEX_LOWER[usize::from(b >> 4)];
        pair[1] = HEX_LOWER[usize::from(b & 0x0F)];
    }
}

/// Parses hex digits (either case) into `out`, one byte per digit pair.
///
/// `offset` is added to error indices so callers decoding a sub-slice of a
/// larger string report positions in the original input.
///
/// # Errors
///
/// Returns [`EncodingError::InvalidAscii`] for non-hex characters and
/// [`EncodingError::InvalidLength`] if `encoded` is not `2 * out.len()` long.
pub fn decode_hex(encoded: &[u8], out: &mut [u8], offset: usize) -> Result<(), EncodingError> {
    if encoded.len() != out.len() * 2 {
        return Err(EncodingError::InvalidLength {
            expected: out.len() * 2,
            len: encoded.len(),
        });
    }
    for (i, slot) in out.iter_mut().enumerate() {
        let hi = nibble(encoded[2 * i], offset + 2 * i)?;
        let lo = nibble(encoded[2 * i + 1], offset + 2 * i + 1)?;
        *slot = (hi << 4) | lo;
    }
    Ok(())
}

fn nibble(byte: u8, index: usize) -> Result<u8, EncodingError> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => Err(EncodingError::InvalidAscii { byte, index }),
    }
}
