use crate::encoding::EncodingError;

const NO_VALUE: u8 = 255;

/// A fixed-width positional codec for arbitrary alphabets (base57, base62,
/// ordered base64).
///
/// Input bytes are treated as one big-endian unsigned integer and written
/// most-significant digit first, left-padded with the zero symbol. Every
/// alphabet defined here is in ascending ASCII order, so equal-width outputs
/// sort exactly like their inputs.
#[derive(Clone, Debug)]
pub struct BaseN {
    alphabet: &'static [u8],
    lookup: [u8; 256],
}

/// `0-9A-Za-z`, used by KSUID.
pub const BASE62: BaseN = BaseN::new(b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// The short-UUID alphabet: base62 without the look-alikes `0`, `1`, `I`,
/// `O` and `l`.
pub const BASE57: BaseN = BaseN::new(b"23456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz");

/// The 64-symbol push-ID alphabet (`-`, digits, upper case, `_`, lower case)
/// used by BetterGUID and SID.
pub const BASE64_ORDERED: BaseN =
    BaseN::new(b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz");

impl BaseN {
    /// Builds a codec from an alphabet of 2 to 255 distinct symbols.
    ///
    /// # Panics
    ///
    /// Panics (at compile time for `const` codecs) if the alphabet is too
    /// short, too long, or contains duplicates.
    #[must_use]
    pub const fn new(alphabet: &'static [u8]) -> Self {
        assert!(alphabet.len() >= 2 && alphabet.len() < 256, "alphabet size");
        let mut lookup = [NO_VALUE; 256];
        let mut i = 0;
        while i < alphabet.len() {
            assert!(lookup[alphabet[i] as usize] == NO_VALUE, "duplicate symbol");
            lookup[alphabet[i] as usize] = i as u8;
            i += 1;
        }
        Self { alphabet, lookup }
    }

    /// The radix of this codec.
    #[must_use]
    pub const fn base(&self) -> u32 {
        self.alphabet.len() as u32
    }

    /// Returns the symbol for `digit`.
    ///
    /// # Panics
    ///
    /// Panics if `digit >= self.base()`.
    #[must_use]
    pub fn symbol(&self, digit: u8) -> u8 {
        self.alphabet[usize::from(digit)]
    }

    /// Returns the digit value of `symbol`, if it belongs to the alphabet.
    #[must_use]
    pub fn digit(&self, symbol: u8) -> Option<u8> {
        match self.lookup[usize::from(symbol)] {
            NO_VALUE => None,
            v => Some(v),
        }
    }

    /// Number of symbols needed to hold any `bytes`-byte value.
    #[must_use]
    pub fn encoded_len(&self, bytes: usize) -> usize {
        let mut num = vec![0xFF_u8; bytes];
        let mut len = 0;
        while num.iter().any(|&b| b != 0) {
            self.div_rem(&mut num);
            len += 1;
        }
        len.max(1)
    }

    /// Divides the big-endian number in place and returns the remainder.
    fn div_rem(&self, num: &mut [u8]) -> u32 {
        let base = self.base();
        let mut rem = 0_u32;
        for byte in num.iter_mut() {
            let acc = (rem << 8) | u32::from(*byte);
            *byte = (acc / base) as u8;
            rem = acc % base;
        }
        rem
    }

    /// Encodes `input` into exactly `out.len()` symbols.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Overflow`] if the value needs more symbols than
    /// `out` holds.
    pub fn encode(&self, input: &[u8], out: &mut [u8]) -> Result<(), EncodingError> {
        let mut num = input.to_vec();
        for slot in out.iter_mut().rev() {
            let rem = self.div_rem(&mut num);
            *slot = self.alphabet[rem as usize];
        }
        if num.iter().any(|&b| b != 0) {
            return Err(EncodingError::Overflow);
        }
        Ok(())
    }

    /// Encodes `input` at the full width for its byte length.
    #[must_use]
    pub fn encode_to_string(&self, input: &[u8]) -> String {
        let mut buf = vec![0_u8; self.encoded_len(input.len())];
        // cannot overflow: the width covers every value of this length
        let _ = self.encode(input, &mut buf);
        buf.into_iter().map(char::from).collect()
    }

    /// Decodes a full-width string into `out`.
    ///
    /// # Errors
    ///
    /// - [`EncodingError::InvalidLength`] unless `encoded` has exactly
    ///   [`BaseN::encoded_len`]`(out.len())` symbols
    /// - [`EncodingError::InvalidAscii`] for symbols outside the alphabet
    /// - [`EncodingError::Overflow`] if the value does not fit in `out`
    pub fn decode(&self, encoded: &str, out: &mut [u8]) -> Result<(), EncodingError> {
        let expected = self.encoded_len(out.len());
        if encoded.len() != expected {
            return Err(EncodingError::InvalidLength {
                expected,
                len: encoded.len(),
            });
        }
        self.decode_digits(encoded.as_bytes(), out, 0)
    }

    /// Decodes an arbitrary run of symbols into `out` without a width check.
    ///
    /// `offset` is added to error indices.
    ///
    /// # Errors
    ///
    /// Same as [`BaseN::decode`], minus the length check.
    pub fn decode_digits(
        &self,
        encoded: &[u8],
        out: &mut [u8],
        offset: usize,
    ) -> Result<(), EncodingError> {
        let base = self.base();
        out.fill(0);
        for (index, &byte) in encoded.iter().enumerate() {
            let Some(digit) = self.digit(byte) else {
                return Err(EncodingError::InvalidAscii {
                    byte,
                    index: offset + index,
                });
            };
            let mut carry = u32::from(digit);
            for b in out.iter_mut().rev() {
                let acc = u32::from(*b) * base + carry;
                *b = (acc & 0xFF) as u8;
                carry = acc >> 8;
            }
            if carry != 0 {
                return Err(EncodingError::Overflow);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_match_reference_formats() {
        assert_eq!(BASE62.encoded_len(20), 27); // KSUID
        assert_eq!(BASE57.encoded_len(16), 22); // short UUID
        assert_eq!(BASE64_ORDERED.encoded_len(6), 8); // push id timestamp
        assert_eq!(BASE64_ORDERED.encoded_len(8), 11); // sid halves
    }

    #[test]
    fn base62_matches_known_ksuid() {
        let mut out = [0_u8; 20];
        BASE62.decode("0ujtsYcgvSTl8PAuAdqWYSMnLOv", &mut out).unwrap();
        assert_eq!(
            out,
            [
                0x06, 0x69, 0xf7, 0xef, 0xb5, 0xa1, 0xcd, 0x34, 0xb5, 0xf9, 0x9d, 0x11, 0x54,
                0xfb, 0x68, 0x53, 0x34, 0x5c, 0x97, 0x35,
            ]
        );
        assert_eq!(BASE62.encode_to_string(&out), "0ujtsYcgvSTl8PAuAdqWYSMnLOv");
    }

    #[test]
    fn base57_matches_known_short_uuid() {
        let bytes = 0xc9b3_a5b7_6d8b_4c1f_9f0e_2a3b_4c5d_6e7f_u128.to_be_bytes();
        assert_eq!(BASE57.encode_to_string(&bytes), "dtZsTGwuupSe8gnj8gbtaG");
    }

    #[test]
    fn zero_and_max_use_the_full_width() {
        assert_eq!(BASE62.encode_to_string(&[0; 20]), "0".repeat(27));
        assert_eq!(BASE62.encode_to_string(&[0xFF; 20]), "aWgEPTl1tmebfsQzFP4bxwgy80V");
        assert_eq!(BASE57.encode_to_string(&[0; 16]), "2".repeat(22));
    }

    #[test]
    fn decode_rejects_values_wider_than_target() {
        let mut out = [0_u8; 20];
        assert_eq!(
            BASE62.decode("zzzzzzzzzzzzzzzzzzzzzzzzzzz", &mut out),
            Err(EncodingError::Overflow)
        );
    }

    #[test]
    fn decode_rejects_foreign_symbols() {
        let mut out = [0_u8; 16];
        // `l` is excluded from base57
        assert_eq!(
            BASE57.decode("dtZsTGwuupSe8gnj8gbtal", &mut out),
            Err(EncodingError::InvalidAscii {
                byte: b'l',
                index: 21
            })
        );
    }

    #[test]
    fn encode_rejects_too_narrow_output() {
        let mut out = [0_u8; 2];
        assert_eq!(
            BASE62.encode(&[0xFF, 0xFF, 0xFF], &mut out),
            Err(EncodingError::Overflow)
        );
    }

    #[test]
    fn fixed_width_encoding_preserves_order() {
        let values = [0_u64, 1, 61, 62, 3_843, 1 << 40, u64::MAX - 1, u64::MAX];
        for codec in [&BASE62, &BASE57, &BASE64_ORDERED] {
            let encoded: Vec<_> = values
                .iter()
                .map(|v| codec.encode_to_string(&v.to_be_bytes()))
                .collect();
            assert!(encoded.windows(2).all(|w| w[0] < w[1]), "{encoded:?}");
        }
    }
}
