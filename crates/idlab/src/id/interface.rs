use core::fmt;
use core::hash::Hash;
use core::str::FromStr;

use crate::EncodingError;

/// A fixed-width identifier value.
///
/// Every ID type is an immutable value with a canonical big-endian byte form
/// and a canonical string form. `Ord` on the value matches `Ord` on
/// [`Id::to_bytes`].
pub trait Id:
    Copy + Clone + fmt::Display + fmt::Debug + Ord + PartialOrd + Eq + PartialEq + Hash + Send + Sync
    + FromStr<Err = EncodingError>
{
    /// Big-endian byte array backing this ID (e.g. `[u8; 16]`).
    type Bytes: AsRef<[u8]>
        + AsMut<[u8]>
        + Copy
        + Default
        + fmt::Debug
        + Eq
        + Ord
        + Hash
        + Send
        + Sync;

    /// Returns the big-endian byte form.
    fn to_bytes(&self) -> Self::Bytes;

    /// Rebuilds an ID from its big-endian byte form.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Overflow`] if reserved bits are set.
    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError>;
}
