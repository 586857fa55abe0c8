use core::cmp::Ordering;
use core::time::Duration;

use parking_lot::Mutex;
#[cfg(feature = "tracing")]
use tracing::{instrument, warn};

use crate::{
    DEFAULT_MAX_WAIT, Error, IdGenerator, PendingCause, Poll, Result, SONYFLAKE_EPOCH,
    SonyflakeId, TimeSource, generator::wait::block_on,
};

/// Default tick length of the distributed-sequence generator.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Configures a [`SonyflakeGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SonyflakeSettings {
    /// Node id embedded in every ID. Must be unique per running generator
    /// within a deployment.
    pub node_id: u16,
    /// Zero point of the tick field, measured from the Unix epoch.
    pub start_epoch: Duration,
    /// Length of one tick. Sub-millisecond precision is ignored.
    pub tick: Duration,
    /// Longest time a single call may block on sequence exhaustion or a
    /// clock rollback.
    pub max_wait: Duration,
}

impl SonyflakeSettings {
    /// Settings with the Sonyflake epoch, a 10 ms tick and a one-second wait
    /// budget.
    #[must_use]
    pub const fn new(node_id: u16) -> Self {
        Self {
            node_id,
            start_epoch: SONYFLAKE_EPOCH,
            tick: DEFAULT_TICK,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    #[must_use]
    pub const fn with_start_epoch(mut self, start_epoch: Duration) -> Self {
        self.start_epoch = start_epoch;
        self
    }

    #[must_use]
    pub const fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    #[must_use]
    pub const fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    last_tick: Option<u64>,
    sequence: u8,
}

/// A lock-based distributed-sequence generator.
///
/// Each ID packs `{tick: 39}{node_id: 16}{sequence: 8}`. Reading the clock,
/// comparing against the last issued tick and bumping the sequence all happen
/// under one mutex, so concurrent callers on one instance never share a
/// `(tick, sequence)` pair.
///
/// - A new tick resets the sequence to zero.
/// - Within a tick the sequence increments; after 256 IDs the generator waits
///   for the next tick boundary.
/// - If the clock reads an earlier tick than the last issued one, the
///   generator waits until it catches up, or fails with
///   [`Error::ClockRollback`] when the gap exceeds the wait budget. A tick is
///   never issued twice.
///
/// Keep one long-lived instance per node; a fresh instance forgets the last
/// issued tick.
pub struct SonyflakeGenerator<T> {
    state: Mutex<State>,
    time: T,
    node_id: u16,
    epoch_millis: u64,
    tick_millis: u64,
    max_wait: Duration,
}

impl<T> SonyflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ClockBeforeEpoch`] if `time` currently reads before
    /// `settings.start_epoch`.
    pub fn new(settings: SonyflakeSettings, time: T) -> Result<Self> {
        let epoch_millis = u64::try_from(settings.start_epoch.as_millis()).unwrap_or(u64::MAX);
        let now_millis = time.current_millis();
        if now_millis < epoch_millis {
            return Err(Error::ClockBeforeEpoch {
                now_millis,
                epoch_millis,
            });
        }
        let tick_millis = u64::try_from(settings.tick.as_millis())
            .unwrap_or(u64::MAX)
            .max(1);
        Ok(Self {
            state: Mutex::new(State::default()),
            time,
            node_id: settings.node_id,
            epoch_millis,
            tick_millis,
            max_wait: settings.max_wait,
        })
    }

    /// The node id embedded in every ID.
    #[must_use]
    pub const fn node_id(&self) -> u16 {
        self.node_id
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// # Returns
    /// - `Ok(Poll::Ready { id })`: A new ID is available
    /// - `Ok(Poll::Pending { yield_for, cause })`: milliseconds to wait
    ///   before the sequence frees up or the clock catches up
    ///
    /// # Errors
    /// - [`Error::ClockBeforeEpoch`] if the clock moved before the epoch
    /// - [`Error::TimestampOverflow`] once the 39-bit tick field is full
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<Poll<SonyflakeId>> {
        let mut state = self.state.lock();
        let now_millis = self.time.current_millis();
        let elapsed = now_millis
            .checked_sub(self.epoch_millis)
            .ok_or(Error::ClockBeforeEpoch {
                now_millis,
                epoch_millis: self.epoch_millis,
            })?;
        let current_tick = elapsed / self.tick_millis;

        let sequence = match state.last_tick {
            None => 0,
            Some(last_tick) => match current_tick.cmp(&last_tick) {
                Ordering::Greater => 0,
                Ordering::Equal => {
                    if state.sequence < SonyflakeId::max_sequence() {
                        state.sequence + 1
                    } else {
                        let yield_for = (current_tick + 1)
                            .saturating_mul(self.tick_millis)
                            .saturating_sub(elapsed);
                        return Ok(Self::cold_sequence_exhausted(current_tick, yield_for));
                    }
                }
                Ordering::Less => {
                    let yield_for = last_tick
                        .saturating_mul(self.tick_millis)
                        .saturating_sub(elapsed);
                    return Ok(Self::cold_clock_behind(last_tick, current_tick, yield_for));
                }
            },
        };

        let id = SonyflakeId::from_components(current_tick, self.node_id, sequence)?;
        state.last_tick = Some(current_tick);
        state.sequence = sequence;
        Ok(Poll::Ready { id })
    }

    /// Generates the next ID, sleeping on the time source when the sequence
    /// is exhausted or the clock is behind.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_poll_id`], plus [`Error::SequenceExhausted`] or
    /// [`Error::ClockRollback`] when waiting would exceed the budget.
    pub fn try_next_id(&self) -> Result<SonyflakeId> {
        block_on(&self.time, self.max_wait, || self.try_poll_id())
    }

    #[cold]
    #[inline(never)]
    fn cold_sequence_exhausted(tick: u64, yield_for: u64) -> Poll<SonyflakeId> {
        Poll::Pending {
            yield_for,
            cause: PendingCause::SequenceExhausted { tick },
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(last_tick: u64, current_tick: u64, yield_for: u64) -> Poll<SonyflakeId> {
        #[cfg(feature = "tracing")]
        warn!(last_tick, current_tick, yield_for, "clock moved backward");
        Poll::Pending {
            yield_for,
            cause: PendingCause::ClockBehind {
                last_tick,
                current_tick,
            },
        }
    }
}

impl<T> IdGenerator for SonyflakeGenerator<T>
where
    T: TimeSource + Send + Sync,
{
    type Id = SonyflakeId;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
