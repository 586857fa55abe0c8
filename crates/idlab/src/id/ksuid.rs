use core::fmt;
use core::str::FromStr;

use crate::{BASE62, EncodingError, Id, KSUID_EPOCH};

/// A 160-bit KSUID (K-Sortable Unique IDentifier).
///
/// ```text
///  Byte:   0            4                        20
///          +------------+------------------------+
///  Field:  | time (32)  | payload (128)          |
///          +------------+------------------------+
/// ```
///
/// `time` counts whole seconds since [`KSUID_EPOCH`]; the payload is random.
/// The string form is 27 base62 characters, left-padded with `0`, so string
/// order follows byte order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ksuid {
    bytes: [u8; 20],
}

impl Ksuid {
    /// Length of the base62 string form.
    pub const STRING_LEN: usize = 27;

    /// Builds a KSUID from its epoch-relative timestamp and payload.
    #[must_use]
    pub fn from_parts(timestamp: u32, payload: [u8; 16]) -> Self {
        let mut bytes = [0_u8; 20];
        bytes[..4].copy_from_slice(&timestamp.to_be_bytes());
        bytes[4..].copy_from_slice(&payload);
        Self { bytes }
    }

    /// Seconds since [`KSUID_EPOCH`].
    #[must_use]
    pub fn timestamp(&self) -> u32 {
        u32::from_be_bytes([self.bytes[0], self.bytes[1], self.bytes[2], self.bytes[3]])
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub fn unix_seconds(&self) -> u64 {
        u64::from(self.timestamp()) + KSUID_EPOCH.as_secs()
    }

    /// The 128-bit random payload.
    #[must_use]
    pub fn payload(&self) -> [u8; 16] {
        let mut payload = [0_u8; 16];
        payload.copy_from_slice(&self.bytes[4..]);
        payload
    }
}

impl fmt::Display for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        BASE62
            .encode(&self.bytes, &mut buf)
            .map_err(|_| fmt::Error)?;
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Ksuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ksuid")
            .field("id", &format_args!("{self}"))
            .field("timestamp", &self.timestamp())
            .field("unix_seconds", &self.unix_seconds())
            .finish_non_exhaustive()
    }
}

impl FromStr for Ksuid {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0_u8; 20];
        BASE62.decode(s, &mut bytes)?;
        Ok(Self { bytes })
    }
}

impl Id for Ksuid {
    type Bytes = [u8; 20];

    fn to_bytes(&self) -> Self::Bytes {
        self.bytes
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Ok(Self { bytes })
    }
}
