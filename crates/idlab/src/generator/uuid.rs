#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{IdGenerator, RandSource, Result, Uuid};

/// Generates random (version 4) UUIDs.
///
/// Stateless: every call draws 16 fresh bytes from the random source and
/// stamps the version and variant bits. No ordering is implied.
#[derive(Clone, Debug, Default)]
pub struct RandomUuidGenerator<R> {
    rng: R,
}

impl<R> RandomUuidGenerator<R>
where
    R: RandSource,
{
    pub const fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draws the next UUID.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::EntropyUnavailable`] if the random source
    /// fails.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Uuid> {
        let mut bytes = [0_u8; 16];
        self.rng.fill_bytes(&mut bytes)?;
        Ok(Uuid::from_random_bytes(bytes))
    }
}

impl<R> IdGenerator for RandomUuidGenerator<R>
where
    R: RandSource + Send + Sync,
{
    type Id = Uuid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
