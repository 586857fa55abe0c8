use core::fmt;
use core::str::FromStr;

use crate::{CROCKFORD, EncodingError, Error, Id, Result};

/// A 128-bit ULID
///
/// - 48 bits timestamp (milliseconds since the Unix epoch)
/// - 80 bits random
///
/// ```text
///  Bit Index:  127            80 79           0
///              +----------------+-------------+
///  Field:      | timestamp (48) | random (80) |
///              +----------------+-------------+
///              |<-- MSB -- 128 bits -- LSB -->|
/// ```
///
/// The string form is 26 characters of Crockford base32. Since the timestamp
/// occupies the most significant bits and the alphabet is ASCII-ordered,
/// string order follows timestamp order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Ulid {
    id: u128,
}

impl Ulid {
    pub const TIMESTAMP_BITS: u32 = 48;
    pub const RANDOM_BITS: u32 = 80;

    pub const RANDOM_SHIFT: u32 = 0;
    pub const TIMESTAMP_SHIFT: u32 = Self::RANDOM_SHIFT + Self::RANDOM_BITS;

    pub const TIMESTAMP_MASK: u128 = (1 << Self::TIMESTAMP_BITS) - 1;
    pub const RANDOM_MASK: u128 = (1 << Self::RANDOM_BITS) - 1;

    /// Length of the Crockford base32 string form.
    pub const STRING_LEN: usize = 26;

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
    /// Returns [`Error::TimestampOverflow`] instead of truncating, since a
    /// truncated timestamp would alias IDs from a different time.
    pub fn from_components(timestamp: u64, random: u128) -> Result<Self> {
        if u128::from(timestamp) > Self::TIMESTAMP_MASK {
            return Err(Error::TimestampOverflow {
                value: u128::from(timestamp),
                bits: Self::TIMESTAMP_BITS,
            });
        }
        Ok(Self::from(timestamp, random))
    }

    /// Extracts the timestamp in milliseconds since the Unix epoch.
    #[must_use]
    pub const fn timestamp(&self) -> u64 {
        ((self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK) as u64
    }

    /// Extracts the 80 random bits.
    #[must_use]
    pub const fn random(&self) -> u128 {
        (self.id >> Self::RANDOM_SHIFT) & Self::RANDOM_MASK
    }

    /// Returns the maximum representable timestamp value.
    #[must_use]
    pub const fn max_timestamp() -> u64 {
        Self::TIMESTAMP_MASK as u64
    }

    /// Returns the maximum representable random value.
    #[must_use]
    pub const fn max_random() -> u128 {
        Self::RANDOM_MASK
    }

    /// Converts this type into its raw type representation
    #[must_use]
    pub const fn to_raw(&self) -> u128 {
        self.id
    }

    /// Converts a raw type into this type
    #[must_use]
    pub const fn from_raw(raw: u128) -> Self {
        Self { id: raw }
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
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        CROCKFORD.encode(&self.id.to_be_bytes(), &mut buf);
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ulid")
            .field("id", &format_args!("{self} (0x{:x})", self.id))
            .field("timestamp", &self.timestamp())
            .field("random", &format_args!("0x{:x}", self.random()))
            .finish()
    }
}

impl FromStr for Ulid {
    type Err = EncodingError;

    /// Decodes Crockford base32, case-insensitively. Strings above
    /// `7ZZZZZZZZZZZZZZZZZZZZZZZZZ` do not fit in 128 bits and are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0_u8; 16];
        CROCKFORD.decode(s, &mut bytes)?;
        Ok(Self::from_raw(u128::from_be_bytes(bytes)))
    }
}

impl Id for Ulid {
    type Bytes = [u8; 16];

    fn to_bytes(&self) -> Self::Bytes {
        self.id.to_be_bytes()
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Ok(Self::from_raw(u128::from_be_bytes(bytes)))
    }
}
