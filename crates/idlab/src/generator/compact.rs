use core::fmt;
use core::hash::Hash;
use core::marker::PhantomData;
use core::str::FromStr;

use crate::{BASE57, BASE62, BaseN, EncodingError, Id, IdGenerator, Result, Uuid};

/// An alphabet for [`Compact`] renderings.
pub trait CompactAlphabet:
    Copy + fmt::Debug + Default + Ord + Hash + Send + Sync + 'static
{
    const CODEC: BaseN;
}

/// Base57: base62 without `0`, `1`, `I`, `O` and `l`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base57;

impl CompactAlphabet for Base57 {
    const CODEC: BaseN = BASE57;
}

/// Base62: `0-9A-Za-z`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Base62;

impl CompactAlphabet for Base62 {
    const CODEC: BaseN = BASE62;
}

/// Another ID rendered in a shorter alphabet.
///
/// The bytes, ordering and uniqueness are exactly those of the wrapped ID;
/// only the string form changes. Output is fixed width and most significant
/// digit first, so string order still follows byte order.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Compact<ID, A = Base57> {
    inner: ID,
    alphabet: PhantomData<A>,
}

/// A random UUID in 22 base57 characters.
pub type ShortUuid = Compact<Uuid, Base57>;

impl<ID, A> Compact<ID, A>
where
    ID: Id,
    A: CompactAlphabet,
{
    pub const fn new(inner: ID) -> Self {
        Self {
            inner,
            alphabet: PhantomData,
        }
    }

    /// Returns the wrapped ID.
    pub fn into_inner(self) -> ID {
        self.inner
    }

    /// Length of the string form.
    #[must_use]
    pub fn string_len() -> usize {
        A::CODEC.encoded_len(ID::Bytes::default().as_ref().len())
    }
}

impl<ID: Id, A: CompactAlphabet> From<ID> for Compact<ID, A> {
    fn from(inner: ID) -> Self {
        Self::new(inner)
    }
}

impl<ID: Id, A: CompactAlphabet> fmt::Display for Compact<ID, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&A::CODEC.encode_to_string(self.inner.to_bytes().as_ref()))
    }
}

impl<ID: Id, A: CompactAlphabet> fmt::Debug for Compact<ID, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compact")
            .field("id", &format_args!("{self}"))
            .field("inner", &self.inner)
            .finish()
    }
}

impl<ID: Id, A: CompactAlphabet> FromStr for Compact<ID, A> {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = ID::Bytes::default();
        A::CODEC.decode(s, bytes.as_mut())?;
        ID::from_bytes(bytes).map(Self::new)
    }
}

impl<ID: Id, A: CompactAlphabet> Id for Compact<ID, A> {
    type Bytes = ID::Bytes;

    fn to_bytes(&self) -> Self::Bytes {
        self.inner.to_bytes()
    }

    fn from_bytes(bytes: Self::Bytes) -> Result<Self, EncodingError> {
        ID::from_bytes(bytes).map(Self::new)
    }
}

/// Re-encodes the output of another generator.
///
/// No uniqueness logic of its own: a `CompactGenerator` over a
/// [`RandomUuidGenerator`] is exactly as unique and as unordered as the UUIDs
/// it wraps.
///
/// [`RandomUuidGenerator`]: crate::RandomUuidGenerator
#[derive(Clone, Debug, Default)]
pub struct CompactGenerator<G, A = Base57> {
    inner: G,
    alphabet: PhantomData<A>,
}

impl<G, A> CompactGenerator<G, A>
where
    G: IdGenerator,
    A: CompactAlphabet,
{
    pub const fn new(inner: G) -> Self {
        Self {
            inner,
            alphabet: PhantomData,
        }
    }

    /// Generates the wrapped ID and re-encodes it.
    ///
    /// # Errors
    ///
    /// Whatever the wrapped generator returns.
    pub fn try_next_id(&self) -> Result<Compact<G::Id, A>> {
        self.inner.try_next_id().map(Compact::new)
    }
}

impl<G, A> IdGenerator for CompactGenerator<G, A>
where
    G: IdGenerator,
    A: CompactAlphabet,
{
    type Id = Compact<G::Id, A>;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Ulid;

    #[test]
    fn short_uuid_matches_reference_encoding() {
        let uuid: Uuid = "c9b3a5b7-6d8b-4c1f-9f0e-2a3b4c5d6e7f".parse().unwrap();
        let short = ShortUuid::new(uuid);
        assert_eq!(short.to_string(), "dtZsTGwuupSe8gnj8gbtaG");
        assert_eq!(ShortUuid::string_len(), 22);
        let parsed: ShortUuid = "dtZsTGwuupSe8gnj8gbtaG".parse().unwrap();
        assert_eq!(parsed.into_inner(), uuid);
    }

    #[test]
    fn base62_ulid_keeps_ulid_order() {
        let a = Compact::<Ulid, Base62>::new(Ulid::from(1, Ulid::max_random()));
        let b = Compact::<Ulid, Base62>::new(Ulid::from(2, 0));
        assert_eq!(Compact::<Ulid, Base62>::string_len(), 22);
        assert!(a < b);
        assert!(a.to_string() < b.to_string());
    }

    #[test]
    fn rejects_ambiguous_characters() {
        assert!(matches!(
            "0tZsTGwuupSe8gnj8gbtaG".parse::<ShortUuid>(),
            Err(EncodingError::InvalidAscii { byte: b'0', index: 0 })
        ));
    }
}
