use core::fmt;
use core::str::FromStr;

use crate::{BASE64_ORDERED, EncodingError, Error, Id, Result};

/// A 120-bit push ID (the BetterGUID / Firebase scheme).
///
/// ```text
///  Bit Index:  119            72 71           0
///              +----------------+-------------+
///  Field:      | timestamp (48) | random (72) |
///              +----------------+-------------+
/// ```
///
/// The string form is 20 symbols of an ASCII-ordered 64-symbol alphabet
/// (`-0-9A-Z_a-z`), six bits each: 8 for the millisecond timestamp, 12 for the
/// random part.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PushId {
    id: u128,
}

impl PushId {
    pub const TIMESTAMP_BITS: u32 = 48;
    pub const RANDOM_BITS: u32 = 72;

    pub const RANDOM_SHIFT: u32 = 0;
    pub const TIMESTAMP_SHIFT: u32 = Self::RANDOM_SHIFT + Self::RANDOM_BITS;

    pub const TIMESTAMP_MASK: u128 = (1 << Self::TIMESTAMP_BITS) - 1;
    pub const RANDOM_MASK: u128 = (1 << Self::RANDOM_BITS) - 1;

    /// Length of the string form.
    pub const STRING_LEN: usize = 20;

    const BYTES: usize = 15;

    /// Packs the components, masking each to its field width.
    #[must_use]
    pub const fn from(timestamp: u64, random: u128) -> Self {
        let t = (timestamp as u128 & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let r = (random & Self::RANDOM_MASK) << Self::RANDOM_SHIFT;
        Self { id: t | r }
    }

    /// Packs the components, rejecting timestamps wider than 48 bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] if `timestamp` does not fit.
    pub fn from_components(timestamp: u64, random: u128) -> Result<Self> {
        if u128::from(timestamp) > Self::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow {
                value: u128::from(timestamp),
                bits: Self::TIMESTAMP_BITS,
            });
        }
        Ok(Self::from(timestamp, random))
    }

    /// Milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        ((self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK) as u64
    }

    #[must_use]
    pub const fn random(&self) -> u128 {
        (self.id >> Self::RANDOM_SHIFT) & Self::RANDOM_MASK
    }

    #[must_use]
    pub const fn max_random() -> u128 {
        Self::RANDOM_MASK
    }

    /// Returns true if the random part can be incremented without carrying
    /// into the timestamp.
    #[must_use]
    pub const fn has_random_room(&self) -> bool {
        self.random() < Self::max_random()
    }

    /// Returns this ID with the random part incremented by one.
    #[must_use]
    pub const fn increment_random(&self) -> Self {
        Self::from(self.timestamp(), self.random() + 1)
    }

    fn raw_bytes(&self) -> [u8; Self::BYTES] {
        let mut bytes = [0_u8; Self::BYTES];
        bytes.copy_from_slice(&self.id.to_be_bytes()[16 - Self::BYTES..]);
        bytes
    }

    fn from_raw_bytes(bytes: [u8; Self::BYTES]) -> Self {
        let mut wide = [0_u8; 16];
        wide[16 - Self::BYTES..].copy_from_slice(&bytes);
        Self {
            id: u128::from_be_bytes(wide),
        }
    }
}

impl fmt::Display for PushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        BASE64_ORDERED
            .encode(&self.raw_bytes(), &mut buf)
            .map_err(|_| fmt::Error)?;
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for PushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushId")
            .field("id", &format_args!("{self}"))
            .field("timestamp", &self.timestamp())
            .field("random", &format_args!("0x{:x}", self.random()))
            .finish()
    }
}

impl FromStr for PushId {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0_u8; Self::BYTES];
        BASE64_ORDERED.decode(s, &mut bytes)?;
        Ok(Self::from_raw_bytes(bytes))
    }
}

impl Id for PushId {
    type Bytes = [u8; 15];

    fn to_bytes(&self) -> Self::Bytes {
        self.raw_bytes()
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Ok(Self::from_raw_bytes(bytes))
    }
}
