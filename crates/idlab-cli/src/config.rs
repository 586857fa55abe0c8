use core::time::Duration;

use anyhow::bail;
use clap::{Parser, ValueEnum};
use idlab::{NodeIdSource, Strategy};

/// Runtime configuration for the `idlab` binary.
///
/// Every option can also come from the environment (or a `.env` file), so a
/// deployment can pin its node identity once instead of on each invocation.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "idlab",
    version,
    about = "Generate unique IDs with one of several strategies"
)]
pub struct CliArgs {
    /// Strategy name or alias (e.g. `ulid`, `sonyflake`), or `list` to print
    /// every registered strategy.
    pub strategy: String,

    /// Number of IDs to print, one per line.
    #[arg(short = 'n', long, default_value_t = 1)]
    pub count: usize,

    /// Explicit node id for distributed-sequence IDs. Implies
    /// `--node-source fixed`.
    ///
    /// Environment variable: `IDLAB_NODE_ID`
    #[arg(long, env = "IDLAB_NODE_ID")]
    pub node_id: Option<u64>,

    /// Where the node id comes from when `--node-id` is not given.
    ///
    /// `machine` differs for every live process on a host. `private-ipv4` is
    /// shared by all processes on a host and falls back to `machine` on hosts
    /// without a private address. Only `--node-id` guarantees distinct nodes
    /// across hosts.
    ///
    /// Environment variable: `IDLAB_NODE_SOURCE`
    #[arg(long, env = "IDLAB_NODE_SOURCE", value_enum, default_value_t = NodeSource::Machine)]
    pub node_source: NodeSource,

    /// Longest time one ID may block on sequence exhaustion or a clock
    /// rollback, in milliseconds.
    ///
    /// Environment variable: `IDLAB_MAX_WAIT_MS`
    #[arg(long, env = "IDLAB_MAX_WAIT_MS", default_value_t = 1_000)]
    pub max_wait_ms: u64,

    /// Clock used by time-based strategies.
    ///
    /// Environment variable: `IDLAB_CLOCK`
    #[arg(long, env = "IDLAB_CLOCK", value_enum, default_value_t = ClockKind::System)]
    pub clock: ClockKind,

    /// Random source used by every strategy.
    ///
    /// Environment variable: `IDLAB_ENTROPY`
    #[arg(long, env = "IDLAB_ENTROPY", value_enum, default_value_t = EntropyKind::Thread)]
    pub entropy: EntropyKind,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeSource {
    Fixed,
    PrivateIpv4,
    Machine,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    /// Wall clock; may move backward.
    System,
    /// Wall clock sampled once, advanced by a monotonic timer.
    Monotonic,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyKind {
    /// Thread-local ChaCha RNG seeded from the OS.
    Thread,
    /// Operating-system entropy on every call.
    Os,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Generate { strategy: Strategy, count: usize },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub command: Command,
    pub node_sources: Vec<NodeIdSource>,
    pub max_wait: Duration,
    pub clock: ClockKind,
    pub entropy: EntropyKind,
}

impl TryFrom<CliArgs> for AppConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let command = if args.strategy == "list" {
            Command::List
        } else {
            if args.count == 0 {
                bail!("--count must be greater than 0");
            }
            Command::Generate {
                strategy: args.strategy.parse()?,
                count: args.count,
            }
        };

        let node_sources = match (args.node_id, args.node_source) {
            (Some(node_id), _) => {
                let Ok(node_id) = u16::try_from(node_id) else {
                    return Err(idlab::Error::InvalidNodeId {
                        node_id,
                        max: u64::from(u16::MAX),
                    }
                    .into());
                };
                vec![NodeIdSource::Fixed(node_id)]
            }
            (None, NodeSource::Fixed) => bail!("--node-source fixed requires --node-id"),
            (None, NodeSource::PrivateIpv4) => {
                vec![NodeIdSource::PrivateIpv4, NodeIdSource::Machine]
            }
            (None, NodeSource::Machine) => vec![NodeIdSource::Machine],
        };

        if args.max_wait_ms == 0 {
            bail!("--max-wait-ms must be greater than 0");
        }

        Ok(Self {
            command,
            node_sources,
            max_wait: Duration::from_millis(args.max_wait_ms),
            clock: args.clock,
            entropy: args.entropy,
        })
    }
}
