use core::time::Duration;

#[cfg(feature = "tracing")]
use tracing::warn;

use crate::{Error, PendingCause, Poll, Result, TimeSource};

/// Default bound on how long a blocking generator may wait for one ID.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(1);

/// Drives `poll` until it yields an ID, sleeping on `time` between attempts.
///
/// The total time spent sleeping never exceeds `max_wait`. A pending result
/// whose `yield_for` would push past the budget fails right away with the
/// error matching its cause.
pub(crate) fn block_on<ID, T>(
    time: &T,
    max_wait: Duration,
    mut poll: impl FnMut() -> Result<Poll<ID>>,
) -> Result<ID>
where
    T: TimeSource + ?Sized,
{
    let mut waited = Duration::ZERO;
    loop {
        match poll()? {
            Poll::Ready { id } => return Ok(id),
            Poll::Pending { yield_for, cause } => {
                let step = Duration::from_millis(yield_for.max(1));
                if waited.checked_add(step).is_none_or(|total| total > max_wait) {
                    return Err(cold_budget_exceeded(cause, step, max_wait));
                }
                time.sleep(step);
                waited += step;
            }
        }
    }
}

#[cold]
#[inline(never)]
fn cold_budget_exceeded(cause: PendingCause, step: Duration, max_wait: Duration) -> Error {
    let err = match cause {
        PendingCause::SequenceExhausted { tick } => Error::SequenceExhausted { tick, max_wait },
        PendingCause::ClockBehind {
            last_tick,
            current_tick,
        } => Error::ClockRollback {
            last_tick,
            current_tick,
            behind: step,
        },
    };
    #[cfg(feature = "tracing")]
    warn!(error = %err, ?max_wait, "wait budget exceeded");
    err
}
