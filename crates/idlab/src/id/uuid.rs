use core::fmt;
use core::str::FromStr;

use crate::{EncodingError, Id, decode_hex, encode_hex};

/// Byte ranges of the `8-4-4-4-12` groups.
const GROUPS: [(usize, usize); 5] = [(0, 4), (4, 6), (6, 8), (8, 10), (10, 16)];

/// A 128-bit RFC 4122 UUID.
///
/// Values produced by [`Uuid::from_random_bytes`] carry version 4 and the
/// RFC 4122 variant:
///
/// ```text
///  Bit Index:  127        80 79     76 75         64 63  62 61          0
///              +------------+---------+-------------+------+-------------+
///  Field:      | random (48)| ver (4) | random (12) | 0b10 | random (62) |
///              +------------+---------+-------------+------+-------------+
/// ```
///
/// 122 bits are random; the string form is lower-case hex `8-4-4-4-12`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Uuid {
    bytes: [u8; 16],
}

impl Uuid {
    /// Length of the hyphenated string form.
    pub const STRING_LEN: usize = 36;

    /// The nil UUID (all zero bits).
    pub const NIL: Self = Self { bytes: [0; 16] };

    /// Wraps raw bytes without touching the version or variant bits.
    #[must_use]
    pub const fn from_raw(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }

    /// Stamps version 4 and the RFC 4122 variant onto 16 random bytes.
    #[must_use]
    pub const fn from_random_bytes(mut bytes: [u8; 16]) -> Self {
        bytes[6] = (bytes[6] & 0x0F) | 0x40;
        bytes[8] = (bytes[8] & 0x3F) | 0x80;
        Self { bytes }
    }

    /// The 4-bit version field.
    #[must_use]
    pub const fn version(&self) -> u8 {
        self.bytes[6] >> 4
    }

    /// The two most significant bits of byte 8 (`0b10` for RFC 4122).
    #[must_use]
    pub const fn variant_bits(&self) -> u8 {
        self.bytes[8] >> 6
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Returns the value as a big-endian `u128`.
    #[must_use]
    pub const fn to_u128(&self) -> u128 {
        u128::from_be_bytes(self.bytes)
    }

    fn encode_to_buf(&self, buf: &mut [u8; Self::STRING_LEN]) {
        let mut pos = 0;
        for (i, &(start, end)) in GROUPS.iter().enumerate() {
            if i > 0 {
                buf[pos] = b'-';
                pos += 1;
            }
            let len = (end - start) * 2;
            encode_hex(&self.bytes[start..end], &mut buf[pos..pos + len]);
            pos += len;
        }
    }
}

impl fmt::Display for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        self.encode_to_buf(&mut buf);
        // hex digits and dashes are ascii
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Uuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uuid")
            .field("id", &format_args!("{self}"))
            .field("version", &self.version())
            .finish()
    }
}

impl FromStr for Uuid {
    type Err = EncodingError;

    /// Parses the hyphenated form; hex digits may be in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.as_bytes();
        if input.len() != Self::STRING_LEN {
            return Err(EncodingError::InvalidLength {
                expected: Self::STRING_LEN,
                len: input.len(),
            });
        }
        let mut bytes = [0_u8; 16];
        let mut pos = 0;
        for (i, &(start, end)) in GROUPS.iter().enumerate() {
            if i > 0 {
                if input[pos] != b'-' {
                    return Err(EncodingError::InvalidAscii {
                        byte: input[pos],
                        index: pos,
                    });
                }
                pos += 1;
            }
            let len = (end - start) * 2;
            decode_hex(&input[pos..pos + len], &mut bytes[start..end], pos)?;
            pos += len;
        }
        Ok(Self { bytes })
    }
}

impl Id for Uuid {
    type Bytes = [u8; 16];

    fn to_bytes(&self) -> Self::Bytes {
        self.bytes
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Ok(Self::from_raw(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_bytes_get_version_and_variant() {
        for fill in [0x00, 0xFF, 0xA5] {
            let id = Uuid::from_random_bytes([fill; 16]);
            assert_eq!(id.version(), 4);
            assert_eq!(id.variant_bits(), 0b10);
        }
    }

    #[test]
    fn displays_lowercase_hyphenated() {
        let id = Uuid::from_raw(0x6ba7_b810_9dad_11d1_80b4_00c0_4fd4_30c8_u128.to_be_bytes());
        assert_eq!(id.to_string(), "6ba7b810-9dad-11d1-80b4-00c04fd430c8");
        assert_eq!(Uuid::NIL.to_string(), "00000000-0000-0000-0000-000000000000");
    }

    #[test]
    fn parses_either_case() {
        let lower: Uuid = "6ba7b810-9dad-11d1-80b4-00c04fd430c8".parse().unwrap();
        let upper: Uuid = "6BA7B810-9DAD-11D1-80B4-00C04FD430C8".parse().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.to_u128(), 0x6ba7_b810_9dad_11d1_80b4_00c0_4fd4_30c8);
    }

    #[test]
    fn rejects_misplaced_dashes() {
        assert_eq!(
            "6ba7b8109-dad-11d1-80b4-00c04fd430c8".parse::<Uuid>(),
            Err(EncodingError::InvalidAscii {
                byte: b'9',
                index: 8
            })
        );
        assert!(matches!(
            "6ba7b810".parse::<Uuid>(),
            Err(EncodingError::InvalidLength { .. })
        ));
        assert_eq!(
            "6ba7b810-9dad-11d1-80b4-00c04fd430cz".parse::<Uuid>(),
            Err(EncodingError::InvalidAscii {
                byte: b'z',
                index: 35
            })
        );
    }
}
