use core::fmt;
use core::str::FromStr;

use crate::{BASE32_HEX_LOWER, EncodingError, Id};

/// A 96-bit XID.
///
/// ```text
///  Byte:   0          4            7        9             12
///          +----------+------------+--------+-------------+
///  Field:  | time (32)| machine(24)| pid(16)| counter (24)|
///          +----------+------------+--------+-------------+
/// ```
///
/// `time` is whole seconds since the Unix epoch. The string form is 20
/// characters of lower-case base32hex (`0-9a-v`), which sorts like the bytes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Xid {
    bytes: [u8; 12],
}

impl Xid {
    /// Length of the base32hex string form.
    pub const STRING_LEN: usize = 20;

    /// Largest value the 24-bit counter field holds.
    pub const MAX_COUNTER: u32 = (1 << 24) - 1;

    /// Packs the components. Only the low 24 bits of `counter` are kept.
    #[must_use]
    pub const fn from_parts(time: u32, machine_id: [u8; 3], process_id: u16, counter: u32) -> Self {
        let [t0, t1, t2, t3] = time.to_be_bytes();
        let [p0, p1] = process_id.to_be_bytes();
        let [_, c0, c1, c2] = (counter & Self::MAX_COUNTER).to_be_bytes();
        let [m0, m1, m2] = machine_id;
        Self {
            bytes: [t0, t1, t2, t3, m0, m1, m2, p0, p1, c0, c1, c2],
        }
    }

    /// Seconds since the Unix epoch.
    #[must_use]
    pub const fn time(&self) -> u32 {
        let b = &self.bytes;
        u32::from_be_bytes([b[0], b[1], b[2], b[3]])
    }

    #[must_use]
    pub const fn machine_id(&self) -> [u8; 3] {
        [self.bytes[4], self.bytes[5], self.bytes[6]]
    }

    #[must_use]
    pub const fn process_id(&self) -> u16 {
        u16::from_be_bytes([self.bytes[7], self.bytes[8]])
    }

    #[must_use]
    pub const fn counter(&self) -> u32 {
        u32::from_be_bytes([0, self.bytes[9], self.bytes[10], self.bytes[11]])
    }
}

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = [0_u8; Self::STRING_LEN];
        BASE32_HEX_LOWER.encode(&self.bytes, &mut buf);
        f.write_str(core::str::from_utf8(&buf).map_err(|_| fmt::Error)?)
    }
}

impl fmt::Debug for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Xid")
            .field("id", &format_args!("{self}"))
            .field("time", &self.time())
            .field("machine_id", &self.machine_id())
            .field("process_id", &self.process_id())
            .field("counter", &self.counter())
            .finish()
    }
}

impl FromStr for Xid {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0_u8; 12];
        BASE32_HEX_LOWER.decode(s, &mut bytes)?;
        Ok(Self { bytes })
    }
}

impl Id for Xid {
    type Bytes = [u8; 12];

    fn to_bytes(&self) -> Self::Bytes {
        self.bytes
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        Ok(Self { bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_xid() {
        let id: Xid = "9m4e2mr0ui3e8a215n4g".parse().unwrap();
        assert_eq!(id.time(), 0x4d88_e15b);
        assert_eq!(id.machine_id(), [0x60, 0xf4, 0x86]);
        assert_eq!(id.process_id(), 0xe428);
        assert_eq!(id.counter(), 0x41_2dc9);
        assert_eq!(
            Xid::from_parts(0x4d88_e15b, [0x60, 0xf4, 0x86], 0xe428, 0x41_2dc9),
            id
        );
        assert_eq!(id.to_string(), "9m4e2mr0ui3e8a215n4g");
    }

    #[test]
    fn counter_wraps_at_24_bits() {
        let id = Xid::from_parts(1, [0; 3], 0, Xid::MAX_COUNTER + 5);
        assert_eq!(id.counter(), 4);
        assert_eq!(id.time(), 1);
    }

    #[test]
    fn rejects_upper_case_and_bad_length() {
        assert!(matches!(
            "9M4E2MR0UI3E8A215N4G".parse::<Xid>(),
            Err(EncodingError::InvalidAscii { index: 1, .. })
        ));
        assert!(matches!(
            "9m4e2mr0ui3e8a215n4".parse::<Xid>(),
            Err(EncodingError::InvalidLength { .. })
        ));
    }
}
