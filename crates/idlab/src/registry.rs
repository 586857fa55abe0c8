use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use std::sync::Arc;

#[cfg(feature = "tracing")]
use tracing::debug;

use crate::{
    CompactGenerator, DEFAULT_MAX_WAIT, Error, IdGenerator, KsuidGenerator, MonoUlidGenerator,
    NodeIdSource, NodeIdentity, PushIdGenerator, RandSource, RandomUuidGenerator, Result,
    SONYFLAKE_EPOCH, SidGenerator, SonyflakeGenerator, SonyflakeSettings, SystemClock,
    ThreadRandom, TimeSource, UlidGenerator, XidGenerator,
};

/// A clock shared by every generator in a registry.
pub type SharedClock = Arc<dyn TimeSource + Send + Sync>;

/// A random source shared by every generator in a registry.
pub type SharedRandom = Arc<dyn RandSource + Send + Sync>;

/// The broad shape of a strategy's output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    /// Pure random, no ordering.
    PureRandom,
    /// Timestamp prefix, lexically sortable.
    TimeSortable,
    /// Time + node + intra-tick sequence.
    DistributedSequence,
    /// Another family re-encoded in a shorter alphabet.
    Compact,
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PureRandom => "pure-random",
            Self::TimeSortable => "time-sortable",
            Self::DistributedSequence => "distributed-sequence",
            Self::Compact => "compact",
        })
    }
}

/// Every generation strategy a registry can hold.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Strategy {
    RandomUuid,
    TimeSortable32,
    TimeSortable32Monotonic,
    Ksuid,
    Xid,
    DistributedSequence,
    CompactEncoded,
    BetterGuid,
    Sid,
}

impl Strategy {
    pub const ALL: [Self; 9] = [
        Self::RandomUuid,
        Self::TimeSortable32,
        Self::TimeSortable32Monotonic,
        Self::Ksuid,
        Self::Xid,
        Self::DistributedSequence,
        Self::CompactEncoded,
        Self::BetterGuid,
        Self::Sid,
    ];

    /// The canonical name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RandomUuid => "random-uuid",
            Self::TimeSortable32 => "time-sortable-32",
            Self::TimeSortable32Monotonic => "time-sortable-32-monotonic",
            Self::Ksuid => "ksuid",
            Self::Xid => "xid",
            Self::DistributedSequence => "distributed-sequence",
            Self::CompactEncoded => "compact-encoded",
            Self::BetterGuid => "betterguid",
            Self::Sid => "sid",
        }
    }

    /// Alternate names accepted by [`Strategy::from_str`].
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::RandomUuid => &["uuid", "uuidv4"],
            Self::TimeSortable32 => &["ulid"],
            Self::TimeSortable32Monotonic => &["ulid-monotonic"],
            Self::DistributedSequence => &["sonyflake"],
            Self::CompactEncoded => &["shortuuid"],
            Self::Ksuid | Self::Xid | Self::BetterGuid | Self::Sid => &[],
        }
    }

    #[must_use]
    pub const fn family(self) -> Family {
        match self {
            Self::RandomUuid => Family::PureRandom,
            Self::DistributedSequence => Family::DistributedSequence,
            Self::CompactEncoded => Family::Compact,
            Self::TimeSortable32
            | Self::TimeSortable32Monotonic
            | Self::Ksuid
            | Self::Xid
            | Self::BetterGuid
            | Self::Sid => Family::TimeSortable,
        }
    }

    /// The family whose IDs a [`Family::Compact`] strategy re-encodes, or
    /// `None` for strategies that produce their own IDs.
    #[must_use]
    pub const fn wraps(self) -> Option<Family> {
        match self {
            Self::CompactEncoded => Some(Family::PureRandom),
            _ => None,
        }
    }

    const fn needs_identity(self) -> bool {
        matches!(self, Self::Xid | Self::DistributedSequence)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = Error;

    /// Matches canonical names and aliases exactly.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == s || strategy.aliases().contains(&s))
            .ok_or_else(|| Error::UnknownStrategy { name: s.to_owned() })
    }
}

/// One constructed generator, tagged by strategy.
pub enum Generator {
    RandomUuid(RandomUuidGenerator<SharedRandom>),
    TimeSortable32(UlidGenerator<SharedClock, SharedRandom>),
    TimeSortable32Monotonic(MonoUlidGenerator<SharedClock, SharedRandom>),
    Ksuid(KsuidGenerator<SharedClock, SharedRandom>),
    Xid(XidGenerator<SharedClock>),
    DistributedSequence(SonyflakeGenerator<SharedClock>),
    CompactEncoded(CompactGenerator<RandomUuidGenerator<SharedRandom>>),
    BetterGuid(PushIdGenerator<SharedClock, SharedRandom>),
    Sid(SidGenerator<SharedClock, SharedRandom>),
}

impl Generator {
    /// Generates one ID in its canonical string form.
    ///
    /// # Errors
    ///
    /// Whatever the underlying generator returns.
    pub fn generate(&self) -> Result<String> {
        match self {
            Self::RandomUuid(g) => g.generate(),
            Self::TimeSortable32(g) => g.generate(),
            Self::TimeSortable32Monotonic(g) => g.generate(),
            Self::Ksuid(g) => g.generate(),
            Self::Xid(g) => g.generate(),
            Self::DistributedSequence(g) => g.generate(),
            Self::CompactEncoded(g) => g.generate(),
            Self::BetterGuid(g) => g.generate(),
            Self::Sid(g) => g.generate(),
        }
    }

    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        match self {
            Self::RandomUuid(_) => Strategy::RandomUuid,
            Self::TimeSortable32(_) => Strategy::TimeSortable32,
            Self::TimeSortable32Monotonic(_) => Strategy::TimeSortable32Monotonic,
            Self::Ksuid(_) => Strategy::Ksuid,
            Self::Xid(_) => Strategy::Xid,
            Self::DistributedSequence(_) => Strategy::DistributedSequence,
            Self::CompactEncoded(_) => Strategy::CompactEncoded,
            Self::BetterGuid(_) => Strategy::BetterGuid,
            Self::Sid(_) => Strategy::Sid,
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Generator").field(&self.strategy()).finish()
    }
}

/// A fixed table from strategy name to generator, built once at startup.
///
/// The registry holds no generation state of its own; each generator owns
/// its state, and stateful ones (the distributed sequence, monotonic ULID,
/// push IDs, SID) live as long as the registry.
///
/// # Example
///
/// ```
/// use idlab::{NodeIdSource, Registry};
///
/// let registry = Registry::builder()
///     .node_sources([NodeIdSource::Fixed(1)])
///     .build()
///     .unwrap();
/// let id = registry.generate("ulid").unwrap();
/// assert_eq!(id.len(), 26);
/// assert!(registry.generate("nope").is_err());
/// ```
#[derive(Debug)]
pub struct Registry {
    generators: Vec<Generator>,
}

impl Registry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Generates one ID with the strategy registered under `name` (canonical
    /// name or alias).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStrategy`] without touching any generator if
    /// `name` is not registered; otherwise whatever the generator returns.
    pub fn generate(&self, name: &str) -> Result<String> {
        let generator = name
            .parse()
            .ok()
            .and_then(|strategy| self.get(strategy))
            .ok_or_else(|| Error::UnknownStrategy {
                name: name.to_owned(),
            })?;
        generator.generate()
    }

    /// Returns the generator for `strategy`, if registered.
    #[must_use]
    pub fn get(&self, strategy: Strategy) -> Option<&Generator> {
        self.generators.iter().find(|g| g.strategy() == strategy)
    }

    /// Registered strategies in registration order.
    pub fn strategies(&self) -> impl Iterator<Item = Strategy> + '_ {
        self.generators.iter().map(Generator::strategy)
    }
}

/// Builds a [`Registry`].
///
/// Defaults: [`SystemClock`], [`ThreadRandom`], node identity resolved from
/// [`NodeIdSource::Machine`], a one-second wait budget, the Sonyflake epoch,
/// and every strategy.
pub struct RegistryBuilder {
    clock: SharedClock,
    rng: SharedRandom,
    identity: Option<NodeIdentity>,
    node_sources: Vec<NodeIdSource>,
    max_wait: Duration,
    sonyflake_epoch: Duration,
    strategies: Vec<Strategy>,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            rng: Arc::new(ThreadRandom),
            identity: None,
            node_sources: vec![NodeIdSource::Machine],
            max_wait: DEFAULT_MAX_WAIT,
            sonyflake_epoch: SONYFLAKE_EPOCH,
            strategies: Strategy::ALL.to_vec(),
        }
    }
}

impl RegistryBuilder {
    #[must_use]
    pub fn clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn rng(mut self, rng: SharedRandom) -> Self {
        self.rng = rng;
        self
    }

    /// Uses `identity` as-is instead of resolving one.
    #[must_use]
    pub fn identity(mut self, identity: NodeIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sources tried in order when no explicit identity is set.
    #[must_use]
    pub fn node_sources(mut self, sources: impl IntoIterator<Item = NodeIdSource>) -> Self {
        self.node_sources = sources.into_iter().collect();
        self
    }

    #[must_use]
    pub fn max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    #[must_use]
    pub fn sonyflake_epoch(mut self, epoch: Duration) -> Self {
        self.sonyflake_epoch = epoch;
        self
    }

    /// Restricts the registry to `strategies`. Duplicates are ignored.
    #[must_use]
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies.clear();
        for strategy in strategies {
            if !self.strategies.contains(&strategy) {
                self.strategies.push(strategy);
            }
        }
        self
    }

    /// Constructs every generator.
    ///
    /// Node identity is resolved only if a registered strategy needs it.
    ///
    /// # Errors
    ///
    /// - [`Error::NodeIdentityUnavailable`] if no node source resolves
    /// - [`Error::ClockBeforeEpoch`] if the clock reads before the Sonyflake
    ///   epoch
    /// - [`Error::EntropyUnavailable`] if seeding the XID counter fails
    pub fn build(self) -> Result<Registry> {
        let identity = match self.identity {
            Some(identity) => Some(identity),
            None if self.strategies.iter().any(|s| s.needs_identity()) => {
                Some(NodeIdentity::resolve_chain(&self.node_sources)?)
            }
            None => None,
        };

        let mut generators = Vec::with_capacity(self.strategies.len());
        for &strategy in &self.strategies {
            let clock = Arc::clone(&self.clock);
            let rng = Arc::clone(&self.rng);
            let generator = match strategy {
                Strategy::RandomUuid => Generator::RandomUuid(RandomUuidGenerator::new(rng)),
                Strategy::TimeSortable32 => {
                    Generator::TimeSortable32(UlidGenerator::new(clock, rng))
                }
                Strategy::TimeSortable32Monotonic => Generator::TimeSortable32Monotonic(
                    MonoUlidGenerator::new(clock, rng).with_max_wait(self.max_wait),
                ),
                Strategy::Ksuid => Generator::Ksuid(KsuidGenerator::new(clock, rng)),
                Strategy::Xid => {
                    let identity = identity.ok_or_else(missing_identity)?;
                    Generator::Xid(XidGenerator::new(clock, &rng, &identity)?)
                }
                Strategy::DistributedSequence => {
                    let identity = identity.ok_or_else(missing_identity)?;
                    let settings = SonyflakeSettings::new(identity.node_id())
                        .with_start_epoch(self.sonyflake_epoch)
                        .with_max_wait(self.max_wait);
                    Generator::DistributedSequence(SonyflakeGenerator::new(settings, clock)?)
                }
                Strategy::CompactEncoded => {
                    Generator::CompactEncoded(CompactGenerator::new(RandomUuidGenerator::new(rng)))
                }
                Strategy::BetterGuid => Generator::BetterGuid(
                    PushIdGenerator::new(clock, rng).with_max_wait(self.max_wait),
                ),
                Strategy::Sid => Generator::Sid(SidGenerator::new(clock, rng)),
            };

            #[cfg(feature = "tracing")]
            debug!(
                strategy = strategy.name(),
                family = %strategy.family(),
                "registered generator"
            );

            generators.push(generator);
        }

        Ok(Registry { generators })
    }
}

fn missing_identity() -> Error {
    Error::NodeIdentityUnavailable {
        reason: "no node identity resolved".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SonyflakeId, Ulid, Uuid};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingClock {
        reads: AtomicUsize,
    }

    impl TimeSource for CountingClock {
        fn current_millis(&self) -> u64 {
            self.reads.fetch_add(1, Ordering::SeqCst);
            1_700_000_000_000
        }
    }

    #[derive(Default)]
    struct CountingRandom {
        draws: AtomicUsize,
    }

    impl RandSource for CountingRandom {
        fn fill_bytes(&self, dest: &mut [u8]) -> Result<()> {
            self.draws.fetch_add(1, Ordering::SeqCst);
            dest.fill(0x5A);
            Ok(())
        }
    }

    fn fixed_identity() -> NodeIdentity {
        NodeIdentity::new(42, [1, 2, 3], 4)
    }

    #[test]
    fn names_and_aliases_resolve() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
            for alias in strategy.aliases() {
                assert_eq!(alias.parse::<Strategy>().unwrap(), strategy);
            }
        }
        assert_eq!("uuidv4".parse::<Strategy>().unwrap(), Strategy::RandomUuid);
        assert_eq!(
            "sonyflake".parse::<Strategy>().unwrap(),
            Strategy::DistributedSequence
        );
        assert_eq!(
            "ULID".parse::<Strategy>(),
            Err(Error::UnknownStrategy {
                name: "ULID".to_owned()
            })
        );
    }

    #[test]
    fn only_compact_strategies_wrap_a_family() {
        for strategy in Strategy::ALL {
            assert_eq!(
                strategy.wraps().is_some(),
                strategy.family() == Family::Compact,
                "{strategy}"
            );
        }
        assert_eq!(Strategy::CompactEncoded.wraps(), Some(Family::PureRandom));
    }

    #[test]
    fn every_strategy_produces_its_shape() {
        let registry = Registry::builder().identity(fixed_identity()).build().unwrap();
        assert_eq!(registry.strategies().count(), Strategy::ALL.len());

        let uuid: Uuid = registry.generate("random-uuid").unwrap().parse().unwrap();
        assert_eq!(uuid.version(), 4);
        let ulid: Ulid = registry.generate("time-sortable-32").unwrap().parse().unwrap();
        assert!(ulid.timestamp() > 0);
        let flake: SonyflakeId = registry.generate("sonyflake").unwrap().parse().unwrap();
        assert_eq!(flake.node_id(), 42);

        for (name, len) in [
            ("compact-encoded", 22),
            ("ksuid", 27),
            ("xid", 20),
            ("betterguid", 20),
            ("sid", 23),
            ("ulid-monotonic", 26),
        ] {
            assert_eq!(registry.generate(name).unwrap().len(), len, "{name}");
        }
    }

    #[test]
    fn unknown_strategy_invokes_no_generator() {
        let clock = Arc::new(CountingClock::default());
        let rng = Arc::new(CountingRandom::default());
        let registry = Registry::builder()
            .clock(clock.clone())
            .rng(rng.clone())
            .identity(fixed_identity())
            .build()
            .unwrap();
        let reads = clock.reads.load(Ordering::SeqCst);
        let draws = rng.draws.load(Ordering::SeqCst);

        assert_eq!(
            registry.generate("snowflake"),
            Err(Error::UnknownStrategy {
                name: "snowflake".to_owned()
            })
        );
        assert_eq!(clock.reads.load(Ordering::SeqCst), reads);
        assert_eq!(rng.draws.load(Ordering::SeqCst), draws);

        registry.generate("uuid").unwrap();
        assert_eq!(rng.draws.load(Ordering::SeqCst), draws + 1);
    }

    #[test]
    fn unregistered_strategy_is_unknown() {
        let registry = Registry::builder()
            .strategies([Strategy::RandomUuid, Strategy::RandomUuid])
            .build()
            .unwrap();
        assert_eq!(registry.strategies().collect::<Vec<_>>(), [Strategy::RandomUuid]);
        assert!(matches!(
            registry.generate("ulid"),
            Err(Error::UnknownStrategy { .. })
        ));
        assert!(registry.get(Strategy::Xid).is_none());
    }

    #[test]
    fn default_node_identity_is_per_process() {
        assert_eq!(Registry::builder().node_sources, [NodeIdSource::Machine]);
    }

    #[test]
    fn registry_surfaces_generator_errors() {
        let clock: SharedClock = Arc::new(CountingClock::default());
        let result = Registry::builder()
            .clock(clock)
            .identity(fixed_identity())
            .sonyflake_epoch(Duration::from_millis(u64::MAX))
            .build();
        assert!(matches!(result, Err(Error::ClockBeforeEpoch { .. })));
    }
}
