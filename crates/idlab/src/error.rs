use core::time::Duration;

use crate::encoding::EncodingError;

/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All error variants that `idlab` can emit.
///
/// Every generator surfaces failures through this type instead of returning a
/// best-effort identifier. A failed generation never yields an empty or
/// possibly duplicated string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The random source could not produce bytes.
    #[error("entropy source unavailable: {reason}")]
    EntropyUnavailable { reason: String },

    /// The timestamp no longer fits in the ID's timestamp field.
    #[error("timestamp {value} exceeds the {bits}-bit timestamp field")]
    TimestampOverflow { value: u128, bits: u32 },

    /// The clock reads a time before the generator's epoch.
    #[error("clock reads {now_millis} ms, before the generator epoch at {epoch_millis} ms")]
    ClockBeforeEpoch { now_millis: u64, epoch_millis: u64 },

    /// The clock moved backward past a tick that was already issued, and
    /// catching up would exceed the configured wait budget.
    #[error(
        "clock moved backward: last issued tick {last_tick}, observed tick {current_tick}, \
         {behind:?} behind"
    )]
    ClockRollback {
        last_tick: u64,
        current_tick: u64,
        behind: Duration,
    },

    /// The intra-tick sequence is exhausted and waiting for the next tick would
    /// exceed the configured wait budget.
    #[error("sequence exhausted for tick {tick}; next tick is beyond the {max_wait:?} wait budget")]
    SequenceExhausted { tick: u64, max_wait: Duration },

    /// No generator is registered under the requested name.
    #[error("unknown strategy: {name:?}")]
    UnknownStrategy { name: String },

    /// A node identifier does not fit in the generator's node field.
    #[error("node id {node_id} out of range; expected 0..={max}")]
    InvalidNodeId { node_id: u64, max: u64 },

    /// None of the configured node identity sources produced a node id.
    #[error("node identity unavailable: {reason}")]
    NodeIdentityUnavailable { reason: String },

    /// A textual ID could not be decoded.
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
