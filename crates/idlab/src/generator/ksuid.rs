#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{Error, IdGenerator, KSUID_EPOCH, Ksuid, RandSource, Result, TimeSource};

/// Generates KSUIDs: whole seconds since [`KSUID_EPOCH`] plus a 128-bit
/// random payload.
///
/// Stateless; IDs from later seconds sort after earlier ones.
#[derive(Clone, Debug, Default)]
pub struct KsuidGenerator<T, R> {
    time: T,
    rng: R,
}

impl<T, R> KsuidGenerator<T, R>
where
    T: TimeSource,
    R: RandSource,
{
    pub const fn new(time: T, rng: R) -> Self {
        Self { time, rng }
    }

    /// Generates a new KSUID.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockBeforeEpoch`] if the clock reads before 2014-05-13
    /// - [`Error::TimestampOverflow`] once the 32-bit seconds field is full
    /// - [`Error::EntropyUnavailable`] if the random source fails
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<Ksuid> {
        let now_millis = self.time.current_millis();
        let epoch_secs = KSUID_EPOCH.as_secs();
        let elapsed = (now_millis / 1000).checked_sub(epoch_secs).ok_or(
            Error::ClockBeforeEpoch {
                now_millis,
                epoch_millis: epoch_secs * 1000,
            },
        )?;
        let timestamp = u32::try_from(elapsed).map_err(|_| Error::TimestampOverflow {
            value: u128::from(elapsed),
            bits: 32,
        })?;
        let mut payload = [0_u8; 16];
        self.rng.fill_bytes(&mut payload)?;
        Ok(Ksuid::from_parts(timestamp, payload))
    }
}

impl<T, R> IdGenerator for KsuidGenerator<T, R>
where
    T: TimeSource + Send + Sync,
    R: RandSource + Send + Sync,
{
    type Id = Ksuid;

    fn try_next_id(&self) -> Result<Self::Id> {
        self.try_next_id()
    }
}
