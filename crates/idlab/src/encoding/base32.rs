use crate::encoding::EncodingError;

const NO_VALUE: u8 = 255;
const BITS_PER_CHAR: usize = 5;
const MASK: u16 = 0x1F;

const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const HEX_LOWER_ALPHABET: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";

/// Where the spare bits go when the input width is not a multiple of five.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// Zero bits are prepended, so the first character carries fewer value
    /// bits (ULID: 2 spare bits, first char is at most `7`).
    Leading,
    /// Zero bits are appended to the last character (XID).
    Trailing,
}

/// A fixed-width base32 codec over big-endian byte strings.
///
/// Both alphabets below are in ascending ASCII order, so for equal-length
/// inputs the encoded strings sort exactly like the underlying bytes.
#[derive(Clone, Debug)]
pub struct Base32 {
    alphabet: &'static [u8; 32],
    lookup: [u8; 256],
    padding: Padding,
}

/// Crockford base32 as used by ULID: upper-case output, case-insensitive
/// decoding, `O`/`I`/`L` accepted as aliases for `0`/`1`/`1`.
pub const CROCKFORD: Base32 = Base32 {
    alphabet: CROCKFORD_ALPHABET,
    lookup: crockford_lookup(),
    padding: Padding::Leading,
};

/// Lower-case base32hex (RFC 4648 extended hex alphabet) as used by XID.
pub const BASE32_HEX_LOWER: Base32 = Base32 {
    alphabet: HEX_LOWER_ALPHABET,
    lookup: exact_lookup(HEX_LOWER_ALPHABET),
    padding: Padding::Trailing,
};

const fn exact_lookup(alphabet: &[u8; 32]) -> [u8; 256] {
    let mut lut = [NO_VALUE; 256];
    let mut i = 0;
    while i < 32 {
        lut[alphabet[i] as usize] = i as u8;
        i += 1;
    }
    lut
}

const fn crockford_lookup() -> [u8; 256] {
    let mut lut = exact_lookup(CROCKFORD_ALPHABET);
    let mut i = 0;
    // allow lower-case
    while i < 32 {
        let c = CROCKFORD_ALPHABET[i];
        if c.is_ascii_uppercase() {
            lut[(c + 32) as usize] = i as u8;
        }
        i += 1;
    }
    lut[b'O' as usize] = 0;
    lut[b'o' as usize] = 0;
    lut[b'I' as usize] = 1;
    lut[b'i' as usize] = 1;
    lut[b'L' as usize] = 1;
    lut[b'l' as usize] = 1;
    lut
}

impl Base32 {
    /// Number of characters needed to encode `bytes` input bytes.
    #[must_use]
    pub const fn encoded_len(bytes: usize) -> usize {
        (bytes * 8).div_ceil(BITS_PER_CHAR)
    }

    /// Returns the padding mode of this codec.
    #[must_use]
    pub const fn padding(&self) -> Padding {
        self.padding
    }

    /// Encodes `input` into `out`.
    ///
    /// `out` must be exactly [`Base32::encoded_len`] bytes long.
    pub fn encode(&self, input: &[u8], out: &mut [u8]) {
        debug_assert_eq!(out.len(), Self::encoded_len(input.len()));
        let spare = out.len() * BITS_PER_CHAR - input.len() * 8;
        let mut bits = match self.padding {
            Padding::Leading => spare,
            Padding::Trailing => 0,
        };
        let mut acc = 0_u16;
        let mut idx = 0;
        for &b in input {
            acc = (acc << 8) | u16::from(b);
            bits += 8;
            while bits >= BITS_PER_CHAR {
                bits -= BITS_PER_CHAR;
                out[idx] = self.alphabet[usize::from((acc >> bits) & MASK)];
                idx += 1;
            }
        }
        if bits > 0 {
            out[idx] = self.alphabet[usize::from((acc << (BITS_PER_CHAR - bits)) & MASK)];
        }
    }

    /// Encodes `input` into a freshly allocated string.
    #[must_use]
    pub fn encode_to_string(&self, input: &[u8]) -> String {
        let mut buf = vec![0_u8; Self::encoded_len(input.len())];
        self.encode(input, &mut buf);
        buf.into_iter().map(char::from).collect()
    }

    /// Decodes `encoded` into `out`, which determines the expected width.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::InvalidLength`] if `encoded` is not exactly
    ///   [`Base32::encoded_len`]`(out.len())` characters
    /// - [`EncodingError::InvalidAscii`] for characters outside the alphabet
    /// - [`EncodingError::Overflow`] if any padding bit is set
    pub fn decode(&self, encoded: &str, out: &mut [u8]) -> Result<(), EncodingError> {
        let expected = Self::encoded_len(out.len());
        if encoded.len() != expected {
            return Err(EncodingError::InvalidLength {
                expected,
                len: encoded.len(),
            });
        }

        let mut skip = match self.padding {
            Padding::Leading => expected * BITS_PER_CHAR - out.len() * 8,
            Padding::Trailing => 0,
        };
        let mut acc = 0_u32;
        let mut bits = 0;
        let mut idx = 0;
        for (index, byte) in encoded.bytes().enumerate() {
            let val = self.lookup[usize::from(byte)];
            if val == NO_VALUE {
                return Err(EncodingError::InvalidAscii { byte, index });
            }
            acc = (acc << BITS_PER_CHAR) | u32::from(val);
            bits += BITS_PER_CHAR;
            if skip > 0 {
                bits -= skip;
                if acc >> bits != 0 {
                    return Err(EncodingError::Overflow);
                }
                skip = 0;
            }
            if bits >= 8 {
                bits -= 8;
                out[idx] = ((acc >> bits) & 0xFF) as u8;
                acc &= (1_u32 << bits) - 1;
                idx += 1;
            }
        }
        // whatever is left is trailing padding
        if acc != 0 {
            return Err(EncodingError::Overflow);
        }
        Ok(())
    }
}
