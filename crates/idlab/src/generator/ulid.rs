use core::cmp::Ordering;
use core::time::Duration;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    DEFAULT_MAX_WAIT, IdGenerator, PendingCause, Poll, RandSource, Result, TimeSource, Ulid,
    generator::wait::block_on,
};

fn random_80(rng: &impl RandSource) -> Result<u128> {
    let mut bytes = [0_u8; 16];
    rng.fill_bytes(&mut bytes[6..])?;
    Ok(u128::from_be_bytes(bytes))
}

/// A stateless ULID generator.
///
/// Each call reads the clock and draws 80 fresh random bits. IDs from later
/// milliseconds sort after earlier ones; IDs within one millisecond are in
/// random order.
#[derive(Clone, Debug, Default)]
pub struct UlidGenerator<T, R> {
    time: T,
    rng: R,
}

impl<T, R> UlidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub const fn new(time: T, rng: R) -> Self {
        Self { time, rng }
    }

    /// Generates a new ULID.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::TimestampOverflow`] past the year 10889
    /// - [`crate::Error::EntropyUnavailable`] if the random source fails
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Ulid> {
        let now = self.time.current_millis();
        let random = random_80(&self.rng)?;
        Ulid::from_components(now, random)
    }
}

impl<T, R> IdGenerator for UlidGenerator<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    type Id = Ulid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}

/// A lock-based *monotonic* ULID generator.
///
/// Within one millisecond the random part of the previous ID is incremented
/// instead of redrawn, so every ID is strictly greater than the last one this
/// instance issued. If the clock moves backward the last timestamp is held.
///
/// Incrementing can only run out after 2^80 IDs in one millisecond; the
/// generator then waits for the next millisecond like any other pending
/// result.
pub struct MonoUlidGenerator<T, R> {
    state: Mutex<Ulid>,
    time: T,
    rng: R,
    max_wait: Duration,
}

impl<T, R> MonoUlidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub fn new(time: T, rng: R) -> Self {
        Self::from_components(0, 0, time, rng)
    }

    /// Creates a generator whose last issued ID is `(timestamp, random)`.
    pub fn from_components(timestamp: u64, random: u128, time: T, rng: R) -> Self {
        Self {
            state: Mutex::new(Ulid::from(timestamp, random)),
            time,
            rng,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Sets the longest time [`Self::try_next_id`] may block.
    #[must_use]
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Attempts to generate the next ULID without blocking.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: A new ID is available
    /// - `Ok(Poll::Pending { yield_for, .. })`: every increment of the current
    ///   millisecond is used up
    ///
    /// # Errors
    /// - [`crate::Error::TimestampOverflow`] past the year 10889
    /// - [`crate::Error::EntropyUnavailable`] if the random source fails
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<Ulid>> {
        let mut id = self.state.lock();
        let now = self.time.current_millis();
        let current_ts = id.timestamp();

        match now.cmp(&current_ts) {
            Ordering::Greater => {
                let random = random_80(&self.rng)?;
                *id = Ulid::from_components(now, random)?;
                Ok(Poll::Ready { id: *id })
            }
            Ordering::Equal | Ordering::Less => {
                if id.has_random_room() {
                    *id = id.increment_random();
                    Ok(Poll::Ready { id: *id })
                } else {
                    Ok(Self::cold_random_exhausted(current_ts))
                }
            }
        }
    }

    /// Generates the next ULID, sleeping within the wait budget if the
    /// current millisecond is used up.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_poll_id`], plus
    /// [`crate::Error::SequenceExhausted`] once the wait budget runs out.
    pub fn try_next_id(&self) -> Result<Ulid> {
        block_on(&self.time, self.max_wait, || self.try_poll_id())
    }

    #[cold]
    #[inline(never)]
    fn cold_random_exhausted(current_ts: u64) -> Poll<Ulid> {
        Poll::Pending {
            yield_for: 1,
            cause: PendingCause::SequenceExhausted { tick: current_ts },
        }
    }
}

impl<T, R> IdGenerator for MonoUlidGenerator<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    type Id = Ulid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
