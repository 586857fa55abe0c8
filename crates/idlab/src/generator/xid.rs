use portable_atomic::{AtomicU32, Ordering};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdGenerator, NodeIdentity, RandSource, Result, TimeSource, Xid};

/// Generates XIDs.
///
/// The machine and process ids come from a [`NodeIdentity`] resolved once at
/// construction. The 24-bit counter starts at a random value and is shared by
/// every caller through an atomic, so no lock is taken.
#[derive(Debug)]
pub struct XidGenerator<T> {
    time: T,
    machine_id: [u8; 3],
    process_id: u16,
    counter: AtomicU32,
}

impl<T> XidGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator, drawing the counter seed from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EntropyUnavailable`] if the random source fails.
    pub fn new(time: T, rng: &impl RandSource, identity: &NodeIdentity) -> Result<Self> {
        let seed = rng.rand_u32()?;
        Ok(Self::from_components(time, identity, seed))
    }

    /// Creates a generator with an explicit counter seed.
    pub const fn from_components(time: T, identity: &NodeIdentity, counter: u32) -> Self {
        Self {
            time,
            machine_id: identity.machine_id(),
            process_id: identity.process_id(),
            counter: AtomicU32::new(counter & Xid::MAX_COUNTER),
        }
    }

    /// Generates a new XID.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TimestampOverflow`] once Unix seconds no longer fit in
    /// 32 bits (2106).
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Xid> {
        let secs = self.time.current_millis() / 1000;
        let time = u32::try_from(secs).map_err(|_| Error::TimestampOverflow {
            value: u128::from(secs),
            bits: 32,
        })?;
        let counter = self.counter.fetch_add(1, Ordering::Relaxed);
        Ok(Xid::from_parts(
            time,
            self.machine_id,
            self.process_id,
            counter,
        ))
    }
}

impl<T> IdGenerator for XidGenerator<T>
where
    T: TimeSource + Send + Sync,
{
    type Id = Xid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
