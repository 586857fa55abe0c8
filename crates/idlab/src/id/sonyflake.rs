use core::fmt;
use core::str::FromStr;

use crate::{EncodingError, Error, Id, Result};

/// A 64-bit distributed-sequence ID.
///
/// - 1 bit reserved (always zero)
/// - 39 bits tick (10 ms units since the generator epoch by default)
/// - 16 bits node ID
/// - 8 bits sequence
///
/// ```text
///  Bit Index:  63 62            24 23           8 7            0
///              +--+---------------+--------------+--------------+
///  Field:      |0 | tick (39)     | node ID (16) | sequence (8) |
///              +--+---------------+--------------+--------------+
///              |<----------- MSB ---- 64 bits ---- LSB -------->|
/// ```
///
/// Numeric order follows tick, then node, then sequence. The string form is
/// the unpadded decimal value.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SonyflakeId {
    id: u64,
}

impl SonyflakeId {
    pub const RESERVED_BITS: u32 = 1;
    pub const TICK_BITS: u32 = 39;
    pub const NODE_BITS: u32 = 16;
    pub const SEQUENCE_BITS: u32 = 8;

    pub const SEQUENCE_SHIFT: u32 = 0;
    pub const NODE_SHIFT: u32 = Self::SEQUENCE_SHIFT + Self::SEQUENCE_BITS;
    pub const TICK_SHIFT: u32 = Self::NODE_SHIFT + Self::NODE_BITS;
    pub const RESERVED_SHIFT: u32 = Self::TICK_SHIFT + Self::TICK_BITS;

    pub const RESERVED_MASK: u64 = (1 << Self::RESERVED_BITS) - 1;
    pub const TICK_MASK: u64 = (1 << Self::TICK_BITS) - 1;
    pub const NODE_MASK: u64 = (1 << Self::NODE_BITS) - 1;
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Packs the components, masking each to its field width.
    #[must_use]
    pub const fn from(tick: u64, node_id: u16, sequence: u8) -> Self {
        let t = (tick & Self::TICK_MASK) << Self::TICK_SHIFT;
        let n = (node_id as u64) << Self::NODE_SHIFT;
        let s = (sequence as u64) << Self::SEQUENCE_SHIFT;
        Self { id: t | n | s }
    }

    /// Packs the components, rejecting ticks wider than 39 bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] if `tick` does not fit.
    pub fn from_components(tick: u64, node_id: u16, sequence: u8) -> Result<Self> {
        if tick > Self::TICK_MASK {
            return Err(Error::TimestampOverflow {
                value: u128::from(tick),
                bits: Self::TICK_BITS,
            });
        }
        Ok(Self::from(tick, node_id, sequence))
    }

    /// Ticks since the generator epoch.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        (self.id >> Self::TICK_SHIFT) & Self::TICK_MASK
    }

    #[must_use]
    pub const fn node_id(&self) -> u16 {
        ((self.id >> Self::NODE_SHIFT) & Self::NODE_MASK) as u16
    }

    #[must_use]
    pub const fn sequence(&self) -> u8 {
        ((self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK) as u8
    }

    /// Returns the maximum representable tick.
    #[must_use]
    pub const fn max_tick() -> u64 {
        Self::TICK_MASK
    }

    /// Returns the maximum sequence within one tick.
    #[must_use]
    pub const fn max_sequence() -> u8 {
        Self::SEQUENCE_MASK as u8
    }

    /// Converts this type into its raw type representation
    #[must_use]
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Converts a raw value into this type, rejecting a set reserved bit.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Overflow`] if the reserved bit is set.
    pub const fn try_from_raw(raw: u64) -> Result<Self, EncodingError> {
        if (raw >> Self::RESERVED_SHIFT) & Self::RESERVED_MASK != 0 {
            return Err(EncodingError::Overflow);
        }
        Ok(Self { id: raw })
    }
}

impl fmt::Display for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SonyflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SonyflakeId")
            .field("id", &format_args!("{} (0x{:x})", self.id, self.id))
            .field("tick", &self.tick())
            .field("node_id", &self.node_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}

impl FromStr for SonyflakeId {
    type Err = EncodingError;

    /// Parses the decimal form. Only ASCII digits are accepted; values that
    /// set the reserved bit are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut raw: u64 = 0;
        if s.is_empty() {
            return Err(EncodingError::InvalidLength {
                expected: 1,
                len: 0,
            });
        }
        for (index, byte) in s.bytes().enumerate() {
            if !byte.is_ascii_digit() {
                return Err(EncodingError::InvalidAscii { byte, index });
            }
            raw = raw
                .checked_mul(10)
                .and_then(|r| r.checked_add(u64::from(byte - b'0')))
                .ok_or(EncodingError::Overflow)?;
        }
        Self::try_from_raw(raw)
    }
}

impl Id for SonyflakeId {
    type Bytes = [u8; 8];

    fn to_bytes(&self) -> Self::Bytes {
        self.id.to_be_bytes()
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Self::try_from_raw(u64::from_be_bytes(bytes))
    }
}
