use std::net::{IpAddr, Ipv4Addr, UdpSocket};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

use crate::{Error, Result};

const MACHINE_ID_PATHS: [&str; 3] = [
    "/etc/machine-id",
    "/var/lib/dbus/machine-id",
    "/etc/hostname",
];

/// Where a process-wide node identifier comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeIdSource {
    /// An operator-assigned value. The only source that can guarantee
    /// distinct node ids across a deployment.
    Fixed(u16),
    /// The lower 16 bits of the host's private IPv4 address (10/8,
    /// 172.16/12, 192.168/16 or 100.64/10). Every process on a host resolves
    /// the same value, so run at most one generator per host with it.
    PrivateIpv4,
    /// A 16-bit hash of the host's machine id (or hostname) XORed with the
    /// process id. Live processes on one host always differ; processes on
    /// different hosts can still collide.
    Machine,
}

/// The identity of the running process, resolved once at startup.
///
/// `node_id` feeds the distributed-sequence generator; `machine_id` and
/// `process_id` feed XID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeIdentity {
    node_id: u16,
    machine_id: [u8; 3],
    process_id: u16,
}

impl NodeIdentity {
    /// Builds an identity from explicit parts.
    #[must_use]
    pub const fn new(node_id: u16, machine_id: [u8; 3], process_id: u16) -> Self {
        Self {
            node_id,
            machine_id,
            process_id,
        }
    }

    /// Resolves the node id from `source`; machine and process ids always come
    /// from the host.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdentityUnavailable`] if the source cannot produce
    /// a value (e.g. no private IPv4 address).
    pub fn resolve(source: &NodeIdSource) -> Result<Self> {
        let fingerprint = machine_fingerprint();
        let process_id = process_id();
        let node_id = match source {
            NodeIdSource::Fixed(id) => *id,
            NodeIdSource::PrivateIpv4 => {
                let [_, _, a, b] = private_ipv4()?.octets();
                u16::from_be_bytes([a, b])
            }
            NodeIdSource::Machine => machine_node_id(fingerprint, process_id),
        };
        let h = fnv1a(fingerprint, &[]);
        let [_, m0, m1, m2] = h.to_be_bytes();

        #[cfg(feature = "tracing")]
        debug!(?source, node_id, process_id, "resolved node identity");

        Ok(Self::new(node_id, [m0, m1, m2], process_id))
    }

    /// Tries each source in order and returns the first identity that
    /// resolves.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NodeIdentityUnavailable`] if every source fails or
    /// `sources` is empty.
    pub fn resolve_chain(sources: &[NodeIdSource]) -> Result<Self> {
        let mut reasons = Vec::new();
        for source in sources {
            match Self::resolve(source) {
                Ok(identity) => return Ok(identity),
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    warn!(?source, error = %e, "node identity source failed");
                    reasons.push(format!("{source:?}: {e}"));
                }
            }
        }
        Err(Error::NodeIdentityUnavailable {
            reason: if reasons.is_empty() {
                "no sources configured".to_owned()
            } else {
                reasons.join("; ")
            },
        })
    }

    /// Node id for distributed-sequence IDs.
    #[must_use]
    pub const fn node_id(&self) -> u16 {
        self.node_id
    }

    /// 3-byte host fingerprint for XID.
    #[must_use]
    pub const fn machine_id(&self) -> [u8; 3] {
        self.machine_id
    }

    /// 16-bit process id for XID.
    #[must_use]
    pub const fn process_id(&self) -> u16 {
        self.process_id
    }
}

/// Reports whether `ip` sits in a private or carrier-grade NAT range.
#[must_use]
pub fn is_private_ipv4(ip: Ipv4Addr) -> bool {
    let [a, b, ..] = ip.octets();
    ip.is_private() || (a == 100 && (64..128).contains(&b))
}

/// Finds the address the host would route outbound traffic from.
///
/// Connecting a UDP socket only selects a route; no packet is sent.
fn private_ipv4() -> Result<Ipv4Addr> {
    let unavailable = |reason: String| Error::NodeIdentityUnavailable { reason };
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .map_err(|e| unavailable(format!("bind: {e}")))?;
    socket
        .connect((Ipv4Addr::new(10, 254, 254, 254), 1))
        .map_err(|e| unavailable(format!("route lookup: {e}")))?;
    match socket
        .local_addr()
        .map_err(|e| unavailable(format!("local address: {e}")))?
        .ip()
    {
        IpAddr::V4(ip) if is_private_ipv4(ip) => Ok(ip),
        ip => Err(unavailable(format!("{ip} is not a private IPv4 address"))),
    }
}

/// Stable bytes describing this host, or the empty slice when nothing is
/// readable.
fn machine_fingerprint() -> &'static [u8] {
    use std::sync::OnceLock;
    static FINGERPRINT: OnceLock<Vec<u8>> = OnceLock::new();
    FINGERPRINT.get_or_init(|| {
        MACHINE_ID_PATHS
            .iter()
            .find_map(|path| {
                std::fs::read_to_string(path)
                    .ok()
                    .map(|s| s.trim().to_owned())
                    .filter(|s| !s.is_empty())
            })
            .or_else(|| std::env::var("HOSTNAME").ok())
            .or_else(|| std::env::var("COMPUTERNAME").ok())
            .unwrap_or_default()
            .into_bytes()
    })
}

/// The process id truncated to 16 bits.
///
/// Containerized processes often run as pid 1; in that case the cgroup path is
/// hashed instead so sibling containers on a host still differ.
fn process_id() -> u16 {
    let pid = std::process::id();
    if pid == 1 {
        if let Ok(cgroup) = std::fs::read("/proc/self/cpuset") {
            let h = fnv1a(&cgroup, &[]);
            return (h & 0xFFFF) as u16;
        }
    }
    (pid & 0xFFFF) as u16
}

/// Folds the host fingerprint to 16 bits and XORs in the process id, so the
/// mapping from pid to node id is a bijection on any one host.
const fn machine_node_id(fingerprint: &[u8], process_id: u16) -> u16 {
    let h = fnv1a(fingerprint, &[]);
    ((h >> 16) as u16 ^ h as u16) ^ process_id
}

/// 32-bit FNV-1a over two byte slices.
const fn fnv1a(a: &[u8], b: &[u8]) -> u32 {
    const OFFSET: u32 = 0x811c_9dc5;
    const PRIME: u32 = 0x0100_0193;
    let mut hash = OFFSET;
    let mut i = 0;
    while i < a.len() {
        hash = (hash ^ a[i] as u32).wrapping_mul(PRIME);
        i += 1;
    }
    let mut i = 0;
    while i < b.len() {
        hash = (hash ^ b[i] as u32).wrapping_mul(PRIME);
        i += 1;
    }
    hash
}
