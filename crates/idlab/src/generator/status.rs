/// Represents the result of a single non-blocking generation attempt.
///
/// - [`Poll::Ready`] carries a freshly generated ID.
/// - [`Poll::Pending`] means the generator cannot issue an ID right now
///   without risking a duplicate, and the caller should retry after
///   `yield_for` milliseconds.
///
/// Blocking callers normally go through [`IdGenerator::try_next_id`], which
/// sleeps on pending results within the configured wait budget.
///
/// [`IdGenerator::try_next_id`]: crate::IdGenerator::try_next_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll<T> {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: T,
    },
    /// No ID could be generated yet.
    Pending {
        /// Milliseconds to wait before trying again.
        yield_for: u64,
        /// What the generator is waiting on.
        cause: PendingCause,
    },
}

/// Why a generator returned [`Poll::Pending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingCause {
    /// Every sequence value (or random increment) of `tick` has been issued.
    SequenceExhausted { tick: u64 },
    /// The clock reads an earlier tick than the last one issued.
    ClockBehind { last_tick: u64, current_tick: u64 },
}
