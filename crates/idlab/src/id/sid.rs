use core::fmt;
use core::str::FromStr;

use crate::{BASE64_ORDERED, EncodingError, Id};

/// A 128-bit SID: a nanosecond timestamp and 63 random bits.
///
/// The string form is two 11-symbol halves of the ordered base64 alphabet
/// joined by `-`:
///
/// ```text
///  <timestamp: 11 symbols>-<random: 11 symbols>
/// ```
///
/// Both halves are fixed width, so string order follows the timestamp.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sid {
    nanos: u64,
    random: u64,
}

impl Sid {
    /// Length of the string form.
    pub const STRING_LEN: usize = 2 * Self::HALF_LEN + 1;

    /// The random half never sets its top bit.
    pub const RANDOM_MASK: u64 = i64::MAX as u64;

    const HALF_LEN: usize = 11;

    /// Packs the components. Only the low 63 bits of `random` are kept.
    #[must_use]
    pub const fn from_parts(nanos: u64, random: u64) -> Self {
        Self {
            nanos,
            random: random & Self::RANDOM_MASK,
        }
    }

    /// Nanoseconds since the Unix epoch.
    #[must_use]
    pub const fn nanos(&self) -> u64 {
        self.nanos
    }

    #[must_use]
    pub const fn random(&self) -> u64 {
        self.random
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        let (head, tail) = buf.split_at_mut(Self::HALF_LEN);
        BASE64_ORDERED
            .encode(&self.nanos.to_be_bytes(), head)
            .map_err(|_| fmt::Error)?;
        tail[0] = b'-';
        BASE64_ORDERED
            .encode(&self.random.to_be_bytes(), &mut tail[1..])
            .map_err(|_| fmt::Error)?;
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sid")
            .field("id", &format_args!("{self}"))
            .field("nanos", &self.nanos)
            .field("random", &self.random)
            .finish()
    }
}

impl FromStr for Sid {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.as_bytes();
        if input.len() != Self::STRING_LEN {
            return Err(EncodingError::InvalidLength {
                expected: Self::STRING_LEN,
                len: input.len(),
            });
        }
        let sep = input[Self::HALF_LEN];
        if sep != b'-' {
            return Err(EncodingError::InvalidAscii {
                byte: sep,
                index: Self::HALF_LEN,
            });
        }
        let mut nanos = [0_u8; 8];
        let mut random = [0_u8; 8];
        BASE64_ORDERED.decode_digits(&input[..Self::HALF_LEN], &mut nanos, 0)?;
        BASE64_ORDERED.decode_digits(
            &input[Self::HALF_LEN + 1..],
            &mut random,
            Self::HALF_LEN + 1,
        )?;
        Self::from_bytes_parts(u64::from_be_bytes(nanos), u64::from_be_bytes(random))
    }
}

impl Sid {
    fn from_bytes_parts(nanos: u64, random: u64) -> Result<Self, EncodingError> {
        if random & !Self::RANDOM_MASK != 0 {
            return Err(EncodingError::Overflow);
        }
        Ok(Self { nanos, random })
    }
}

impl Id for Sid {
    type Bytes = [u8; 16];

    fn to_bytes(&self) -> Self::Bytes {
        let mut bytes = [0_u8; 16];
        bytes[..8].copy_from_slice(&self.nanos.to_be_bytes());
        bytes[8..].copy_from_slice(&self.random.to_be_bytes());
        bytes
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        let mut nanos = [0_u8; 8];
        let mut random = [0_u8; 8];
        nanos.copy_from_slice(&bytes[..8]);
        random.copy_from_slice(&bytes[8..]);
        Self::from_bytes_parts(u64::from_be_bytes(nanos), u64::from_be_bytes(random))
    }
}
