use core::time::Duration;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    DEFAULT_MAX_WAIT, IdGenerator, PendingCause, Poll, PushId, RandSource, Result, TimeSource,
    generator::wait::block_on,
};

/// A lock-based push ID (BetterGUID) generator.
///
/// A new millisecond draws 72 fresh random bits; repeated calls within the
/// same millisecond increment the previous random part so IDs from one
/// instance are strictly increasing. A clock that moves backward keeps the
/// last timestamp.
pub struct PushIdGenerator<T, R> {
    state: Mutex<PushId>,
    time: T,
    rng: R,
    max_wait: Duration,
}

impl<T, R> PushIdGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub fn new(time: T, rng: R) -> Self {
        Self {
            state: Mutex::new(PushId::from(0, 0)),
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

    /// Attempts to generate the next push ID without blocking.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::TimestampOverflow`] past the year 10889
    /// - [`crate::Error::EntropyUnavailable`] if the random source fails
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<PushId>> {
        let mut id = self.state.lock();
        let now = self.time.current_millis();
        let current_ts = id.timestamp();

        if now > current_ts {
            let mut bytes = [0_u8; 16];
            self.rng.fill_bytes(&mut bytes[7..])?;
            *id = PushId::from_components(now, u128::from_be_bytes(bytes))?;
            return Ok(Poll::Ready { id: *id });
        }
        if id.has_random_room() {
            *id = id.increment_random();
            Ok(Poll::Ready { id: *id })
        } else {
            Ok(Self::cold_random_exhausted(current_ts))
        }
    }

    /// Generates the next push ID, sleeping within the wait budget if the
    /// current millisecond is used up.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_poll_id`], plus
    /// [`crate::Error::SequenceExhausted`] once the wait budget runs out.
    pub fn try_next_id(&self) -> Result<PushId> {
        block_on(&self.time, self.max_wait, || self.try_poll_id())
    }

    #[cold]
    #[inline(never)]
    fn cold_random_exhausted(current_ts: u64) -> Poll<PushId> {
        Poll::Pending {
            yield_for: 1,
            cause: PendingCause::SequenceExhausted { tick: current_ts },
        }
    }
}

impl<T, R> IdGenerator for PushIdGenerator<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    type Id = PushId;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
