use std::{
    sync::Arc,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

/// Sonyflake epoch: Monday, September 1, 2014 00:00:00 UTC
pub const SONYFLAKE_EPOCH: Duration = Duration::from_millis(1_409_529_600_000);

/// KSUID epoch: Tuesday, May 13, 2014 16:53:20 UTC
pub const KSUID_EPOCH: Duration = Duration::from_secs(1_400_000_000);

/// A source of wall-clock time.
///
/// Timestamps are measured from the Unix epoch; each generator subtracts its
/// own epoch. The [`TimeSource::sleep`] hook lets blocking generators wait on
/// the same clock they read, so test clocks can advance instead of sleeping.
///
/// # Example
///
/// ```
/// use idlab::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// assert_eq!(time.current_nanos(), 1_234_000_000);
/// ```
pub trait TimeSource {
    /// Milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;

    /// Nanoseconds since the Unix epoch.
    fn current_nanos(&self) -> u128 {
        u128::from(self.current_millis()) * 1_000_000
    }

    /// Blocks the calling thread for `duration`.
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }

    fn current_nanos(&self) -> u128 {
        (**self).current_nanos()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }

    fn current_nanos(&self) -> u128 {
        (**self).current_nanos()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration);
    }
}

fn since_unix_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
}

fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// The operating system's wall clock.
///
/// This clock follows NTP and manual adjustments, so it may move backward.
/// Generators that depend on ordering detect that case themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        saturating_millis(since_unix_epoch())
    }

    fn current_nanos(&self) -> u128 {
        since_unix_epoch().as_nanos()
    }
}

/// A clock that never moves backward.
///
/// The wall-clock time is sampled once at construction; every later reading
/// adds the elapsed time of a monotonic [`Instant`]. Adjustments to the system
/// clock after construction are ignored.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    start: Instant,
    offset: Duration,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Anchors a new clock at the current wall-clock time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_offset(since_unix_epoch())
    }

    /// Anchors a new clock at `offset` since the Unix epoch.
    #[must_use]
    pub fn with_offset(offset: Duration) -> Self {
        Self {
            start: Instant::now(),
            offset,
        }
    }

    fn now(&self) -> Duration {
        self.offset + self.start.elapsed()
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        saturating_millis(self.now())
    }

    fn current_nanos(&self) -> u128 {
        self.now().as_nanos()
    }
}
