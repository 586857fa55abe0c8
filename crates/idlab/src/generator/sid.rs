use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdGenerator, RandSource, Result, Sid, TimeSource};

/// Generates SIDs: a nanosecond timestamp plus 63 random bits.
///
/// The timestamp half is strictly increasing per instance. When the clock
/// repeats or regresses, the last timestamp plus one nanosecond is used
/// instead, so this generator never waits.
pub struct SidGenerator<T, R> {
    last_nanos: Mutex<u64>,
    time: T,
    rng: R,
}

impl<T, R> SidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub fn new(time: T, rng: R) -> Self {
        Self {
            last_nanos: Mutex::new(0),
            time,
            rng,
        }
    }

    /// Generates a new SID.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] once nanoseconds no longer fit in 64
    ///   bits (2554)
    /// - [`Error::EntropyUnavailable`] if the random source fails
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Sid> {
        let random = self.rng.rand_u64()?;
        let mut last = self.last_nanos.lock();
        let candidate = self.time.current_nanos().max(u128::from(*last) + 1);
        let nanos = u64::try_from(candidate).map_err(|_| Error::TimestampOverflow {
            value: candidate,
            bits: 64,
        })?;
        *last = nanos;
        Ok(Sid::from_parts(nanos, random))
    }
}

impl<T, R> IdGenerator for SidGenerator<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    type Id = Sid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
