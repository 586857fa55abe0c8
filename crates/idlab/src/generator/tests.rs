use core::time::Duration;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::scope;

use crate::{
    Base62, Compact, CompactGenerator, Error, Id, IdGenerator, KSUID_EPOCH, Ksuid,
    KsuidGenerator, MonoUlidGenerator, NodeIdentity, PendingCause, Poll, PushId, PushIdGenerator,
    RandSource, RandomUuidGenerator, Result, SeededRandom, ShortUuid, SidGenerator,
    SonyflakeGenerator, SonyflakeId, SonyflakeSettings, ThreadRandom, TimeSource, Ulid,
    UlidGenerator, Uuid, Xid, XidGenerator,
};

/// A settable clock. `sleep` advances it instead of blocking, unless frozen.
struct MockTime {
    millis: AtomicU64,
    frozen: bool,
}

impl MockTime {
    fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
            frozen: false,
        }
    }

    fn frozen(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
            frozen: true,
        }
    }

    fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        if !self.frozen {
            let step = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
            self.millis.fetch_add(step, Ordering::SeqCst);
        }
    }
}

struct FailingRandom;

impl RandSource for FailingRandom {
    fn fill_bytes(&self, _dest: &mut [u8]) -> Result<()> {
        Err(Error::EntropyUnavailable {
            reason: "entropy pool closed".to_owned(),
        })
    }
}

trait PollExt<T> {
    fn unwrap_ready(self) -> T;
    fn unwrap_pending(self) -> (u64, PendingCause);
}

impl<T: core::fmt::Debug> PollExt<T> for Poll<T> {
    fn unwrap_ready(self) -> T {
        match self {
            Self::Ready { id } => id,
            Self::Pending { yield_for, cause } => {
                panic!("unexpected pending (yield for: {yield_for}, cause: {cause:?})")
            }
        }
    }

    fn unwrap_pending(self) -> (u64, PendingCause) {
        match self {
            Self::Ready { id } => panic!("unexpected ready ({id:?})"),
            Self::Pending { yield_for, cause } => (yield_for, cause),
        }
    }
}

fn unix_settings(node_id: u16) -> SonyflakeSettings {
    SonyflakeSettings::new(node_id).with_start_epoch(Duration::ZERO)
}

fn sonyflake_at(node_id: u16, time: &MockTime) -> SonyflakeGenerator<&MockTime> {
    SonyflakeGenerator::new(unix_settings(node_id), time).unwrap()
}

fn drain_tick<T: TimeSource>(generator: &SonyflakeGenerator<T>) {
    for _ in 0..=SonyflakeId::max_sequence() {
        generator.try_poll_id().unwrap().unwrap_ready();
    }
}

#[test]
fn generators_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<SonyflakeGenerator<MockTime>>();
    assert_send_sync::<MonoUlidGenerator<MockTime, ThreadRandom>>();
    assert_send_sync::<PushIdGenerator<MockTime, SeededRandom>>();
    assert_send_sync::<XidGenerator<MockTime>>();
    assert_send_sync::<SidGenerator<MockTime, ThreadRandom>>();
}

#[test]
fn sonyflake_sequence_increments_within_same_tick() {
    let time = MockTime::new(420);
    let generator = sonyflake_at(7, &time);
    let id1 = generator.try_next_id().unwrap();
    let id2 = generator.try_next_id().unwrap();
    let id3 = generator.try_next_id().unwrap();

    for id in [id1, id2, id3] {
        assert_eq!(id.tick(), 42);
        assert_eq!(id.node_id(), 7);
    }
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn sonyflake_new_tick_resets_sequence() {
    let time = MockTime::new(420);
    let generator = sonyflake_at(0, &time);
    generator.try_next_id().unwrap();
    generator.try_next_id().unwrap();
    time.set(431);
    let id = generator.try_next_id().unwrap();
    assert_eq!(id.tick(), 43);
    assert_eq!(id.sequence(), 0);
}

#[test]
fn sonyflake_pending_until_next_tick_boundary() {
    let time = MockTime::new(425);
    let generator = sonyflake_at(0, &time);
    drain_tick(&generator);

    let (yield_for, cause) = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 5);
    assert_eq!(cause, PendingCause::SequenceExhausted { tick: 42 });
}

#[test]
fn sonyflake_overflow_moves_to_next_tick() {
    let time = MockTime::new(420);
    let generator = sonyflake_at(0, &time);
    for i in 0..=SonyflakeId::max_sequence() {
        let id = generator.try_next_id().unwrap();
        assert_eq!(id.tick(), 42);
        assert_eq!(id.sequence(), i);
    }

    let id = generator.try_next_id().unwrap();
    assert_eq!(id.tick(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(time.current_millis(), 430);
}

#[test]
fn sonyflake_exhaustion_beyond_budget_fails() {
    let settings = unix_settings(0).with_max_wait(Duration::from_millis(30));
    let time = MockTime::frozen(420);
    let generator = SonyflakeGenerator::new(settings, &time).unwrap();
    drain_tick(&generator);

    assert_eq!(
        generator.try_next_id(),
        Err(Error::SequenceExhausted {
            tick: 42,
            max_wait: Duration::from_millis(30),
        })
    );
}

#[test]
fn sonyflake_small_rollback_blocks_until_caught_up() {
    let time = MockTime::new(1_000);
    let generator = sonyflake_at(0, &time);
    let first = generator.try_next_id().unwrap();
    assert_eq!(first.tick(), 100);

    time.set(950);
    let (yield_for, cause) = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 50);
    assert_eq!(
        cause,
        PendingCause::ClockBehind {
            last_tick: 100,
            current_tick: 95
        }
    );

    let next = generator.try_next_id().unwrap();
    assert_eq!(next.tick(), 100);
    assert_eq!(next.sequence(), 1);
    assert!(next > first);
}

#[test]
fn sonyflake_large_rollback_reports_error_and_never_reuses() {
    let time = MockTime::new(10_000);
    let generator = sonyflake_at(0, &time);
    let first = generator.try_next_id().unwrap();

    time.set(5_000);
    assert_eq!(
        generator.try_next_id(),
        Err(Error::ClockRollback {
            last_tick: 1_000,
            current_tick: 500,
            behind: Duration::from_secs(5),
        })
    );

    time.set(10_000);
    let next = generator.try_next_id().unwrap();
    assert_eq!(next.tick(), first.tick());
    assert_eq!(next.sequence(), first.sequence() + 1);
}

#[test]
fn sonyflake_rejects_clock_before_epoch() {
    let settings = SonyflakeSettings::new(0);
    let result = SonyflakeGenerator::new(settings, MockTime::new(1_000));
    assert!(matches!(result, Err(Error::ClockBeforeEpoch { .. })));
}

#[test]
fn sonyflake_tick_overflow_is_an_error() {
    let settings = unix_settings(0).with_tick(Duration::from_millis(1));
    let generator = SonyflakeGenerator::new(settings, MockTime::new(1 << 39)).unwrap();
    assert_eq!(
        generator.try_next_id(),
        Err(Error::TimestampOverflow {
            value: 1 << 39,
            bits: 39,
        })
    );
}

#[test]
fn sonyflake_huge_tick_exhaustion_fails_without_overflow() {
    let tick = Duration::from_millis(1 << 63);
    let now = (1 << 63) + 5;
    let time = MockTime::new(now);
    let generator = SonyflakeGenerator::new(unix_settings(0).with_tick(tick), &time).unwrap();
    drain_tick(&generator);

    let (yield_for, cause) = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, u64::MAX - now);
    assert_eq!(cause, PendingCause::SequenceExhausted { tick: 1 });
    assert_eq!(
        generator.try_next_id(),
        Err(Error::SequenceExhausted {
            tick: 1,
            max_wait: Duration::from_secs(1),
        })
    );
    assert_eq!(time.current_millis(), now);
}

#[test]
fn sonyflake_distinct_nodes_never_collide() {
    let time_a = MockTime::new(420);
    let a = sonyflake_at(1, &time_a);
    let time_b = MockTime::new(420);
    let b = sonyflake_at(2, &time_b);
    let mut seen = HashSet::new();
    for _ in 0..2_000 {
        assert!(seen.insert(a.try_next_id().unwrap()));
        assert!(seen.insert(b.try_next_id().unwrap()));
    }
    assert_eq!(seen.len(), 4_000);
}

#[test]
fn sonyflake_concurrent_calls_never_share_tick_and_sequence() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 100_000;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let time = MockTime::new(1_000);
    let generator = sonyflake_at(3, &time);
    let seen = Mutex::new(HashSet::with_capacity(TOTAL_IDS));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.try_next_id().unwrap();
                    assert_eq!(id.node_id(), 3);
                    assert!(seen.lock().unwrap().insert((id.tick(), id.sequence())));
                }
            });
        }
    });

    assert_eq!(seen.into_inner().unwrap().len(), TOTAL_IDS);
}

#[test]
fn ulid_strings_follow_time() {
    let time = MockTime::new(1_000);
    let generator = UlidGenerator::new(&time, SeededRandom::new(1));
    let mut last = generator.generate().unwrap();
    for ms in 1_001..1_200 {
        time.set(ms);
        let next = generator.generate().unwrap();
        assert_eq!(next.len(), Ulid::STRING_LEN);
        assert!(next > last, "{next} should sort after {last}");
        last = next;
    }
}

#[test]
fn ulid_timestamp_overflow_is_an_error() {
    let generator = UlidGenerator::new(MockTime::new(1 << 48), ThreadRandom);
    assert!(matches!(
        generator.try_next_id(),
        Err(Error::TimestampOverflow { bits: 48, .. })
    ));
}

#[test]
fn mono_ulid_increments_within_millisecond() {
    let time = MockTime::new(77);
    let generator = MonoUlidGenerator::new(&time, SeededRandom::new(9));
    let first = generator.try_next_id().unwrap();
    let second = generator.try_next_id().unwrap();
    assert_eq!(first.timestamp(), 77);
    assert_eq!(second.timestamp(), 77);
    assert_eq!(second.random(), first.random() + 1);

    // a regressed clock keeps the last timestamp
    time.set(50);
    let third = generator.try_next_id().unwrap();
    assert_eq!(third.timestamp(), 77);
    assert!(third > second);
    assert!(third.to_string() > second.to_string());
}

#[test]
fn mono_ulid_waits_when_random_is_exhausted() {
    let generator =
        MonoUlidGenerator::from_components(5, Ulid::max_random(), MockTime::new(5), ThreadRandom);
    let (yield_for, cause) = generator.try_poll_id().unwrap().unwrap_pending();
    assert_eq!(yield_for, 1);
    assert_eq!(cause, PendingCause::SequenceExhausted { tick: 5 });

    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 6);
}

#[test]
fn ksuid_counts_seconds_from_its_epoch() {
    let millis = (KSUID_EPOCH.as_secs() + 107_608_047) * 1000 + 999;
    let generator = KsuidGenerator::new(MockTime::new(millis), SeededRandom::new(3));
    let id = generator.try_next_id().unwrap();
    assert_eq!(id.timestamp(), 107_608_047);
    assert_eq!(id.to_string().len(), Ksuid::STRING_LEN);
}

#[test]
fn ksuid_rejects_out_of_range_clocks() {
    let before = KsuidGenerator::new(MockTime::new(1_000), ThreadRandom);
    assert_eq!(
        before.try_next_id(),
        Err(Error::ClockBeforeEpoch {
            now_millis: 1_000,
            epoch_millis: 1_400_000_000_000,
        })
    );

    let after_secs = KSUID_EPOCH.as_secs() + (1 << 32);
    let after = KsuidGenerator::new(MockTime::new(after_secs * 1000), ThreadRandom);
    assert_eq!(
        after.try_next_id(),
        Err(Error::TimestampOverflow {
            value: 1 << 32,
            bits: 32,
        })
    );
}

#[test]
fn xid_embeds_identity_and_counts() {
    let identity = NodeIdentity::new(0, [0xAA, 0xBB, 0xCC], 0x1234);
    let generator =
        XidGenerator::from_components(MockTime::new(1_700_000_000_500), &identity, Xid::MAX_COUNTER);
    let a = generator.try_next_id().unwrap();
    let b = generator.try_next_id().unwrap();
    assert_eq!(a.time(), 1_700_000_000);
    assert_eq!(a.machine_id(), [0xAA, 0xBB, 0xCC]);
    assert_eq!(a.process_id(), 0x1234);
    assert_eq!(a.counter(), Xid::MAX_COUNTER);
    assert_eq!(b.counter(), 0);
}

#[test]
fn xid_strings_follow_time() {
    let identity = NodeIdentity::new(0, [1, 2, 3], 4);
    let time = MockTime::new(1_000_000);
    let generator = XidGenerator::new(&time, &SeededRandom::new(5), &identity).unwrap();
    let early = generator.generate().unwrap();
    time.set(2_000_000);
    let late = generator.generate().unwrap();
    assert!(late > early);
}

#[test]
fn push_ids_increase_within_millisecond_and_across_regressions() {
    let time = MockTime::new(1_700_000_000_000);
    let generator = PushIdGenerator::new(&time, SeededRandom::new(11));
    let mut last = generator.try_next_id().unwrap();
    for step in 0..100 {
        if step == 50 {
            time.set(1_600_000_000_000);
        }
        let next = generator.try_next_id().unwrap();
        assert_eq!(next.timestamp(), 1_700_000_000_000);
        assert!(next.to_string() > last.to_string());
        last = next;
    }
    assert_eq!(last.to_string().len(), PushId::STRING_LEN);
}

#[test]
fn sid_timestamps_strictly_increase() {
    let generator = SidGenerator::new(MockTime::new(42), SeededRandom::new(13));
    let first = generator.try_next_id().unwrap();
    let second = generator.try_next_id().unwrap();
    assert_eq!(first.nanos(), 42_000_000);
    assert_eq!(second.nanos(), 42_000_001);
    assert!(second.to_string() > first.to_string());
}

#[test]
fn random_uuids_are_unique_v4() {
    let generator = RandomUuidGenerator::new(ThreadRandom);
    let mut seen = HashSet::new();
    for _ in 0..1_000 {
        let id = generator.try_next_id().unwrap();
        assert_eq!(id.version(), 4);
        assert_eq!(id.variant_bits(), 0b10);
        assert_eq!(id.to_string().len(), Uuid::STRING_LEN);
        assert!(seen.insert(id));
    }
}

#[test]
fn short_uuid_wraps_random_uuid() {
    let generator = CompactGenerator::<_>::new(RandomUuidGenerator::new(SeededRandom::new(17)));
    let short: ShortUuid = generator.try_next_id().unwrap();
    let text = short.to_string();
    assert_eq!(text.len(), 22);
    let parsed: ShortUuid = text.parse().unwrap();
    assert_eq!(parsed, short);
    assert_eq!(parsed.into_inner().version(), 4);
}

#[test]
fn base62_ulid_generator_keeps_order() {
    let time = MockTime::new(10);
    let generator: CompactGenerator<_, Base62> =
        CompactGenerator::new(UlidGenerator::new(&time, ThreadRandom));
    let a: Compact<Ulid, Base62> = generator.try_next_id().unwrap();
    time.set(11);
    let b = generator.try_next_id().unwrap();
    assert!(a.to_string() < b.to_string());
}

#[test]
fn seeded_generators_are_reproducible() {
    let a = RandomUuidGenerator::new(SeededRandom::new(99));
    let b = RandomUuidGenerator::new(SeededRandom::new(99));
    assert_eq!(a.try_next_id().unwrap(), b.try_next_id().unwrap());
}

#[test]
fn entropy_failure_surfaces_as_error() {
    let time = MockTime::new(1_700_000_000_000);
    let unavailable = |result: Result<String>| {
        assert!(
            matches!(result, Err(Error::EntropyUnavailable { .. })),
            "{result:?}"
        );
    };
    unavailable(RandomUuidGenerator::new(FailingRandom).generate());
    unavailable(UlidGenerator::new(&time, FailingRandom).generate());
    unavailable(MonoUlidGenerator::new(&time, FailingRandom).generate());
    unavailable(KsuidGenerator::new(&time, FailingRandom).generate());
    unavailable(PushIdGenerator::new(&time, FailingRandom).generate());
    unavailable(SidGenerator::new(&time, FailingRandom).generate());
    unavailable(
        XidGenerator::new(&time, &FailingRandom, &NodeIdentity::new(0, [0; 3], 0))
            .map(|_| String::new()),
    );
}

#[test]
fn time_sortable_strings_roundtrip() {
    fn roundtrip<G: IdGenerator>(generator: &G) {
        let id = generator.try_next_id().unwrap();
        let text = id.to_string();
        let parsed: G::Id = text.parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.to_string(), text);
        assert_eq!(G::Id::from_bytes(id.to_bytes()).unwrap(), id);
    }

    let time = MockTime::new(1_700_000_000_000);
    let identity = NodeIdentity::new(9, [7, 7, 7], 77);
    roundtrip(&UlidGenerator::new(&time, ThreadRandom));
    roundtrip(&MonoUlidGenerator::new(&time, ThreadRandom));
    roundtrip(&KsuidGenerator::new(&time, ThreadRandom));
    roundtrip(&XidGenerator::new(&time, &ThreadRandom, &identity).unwrap());
    roundtrip(&PushIdGenerator::new(&time, ThreadRandom));
    roundtrip(&SidGenerator::new(&time, ThreadRandom));
    roundtrip(&SonyflakeGenerator::new(unix_settings(9), &time).unwrap());
}
