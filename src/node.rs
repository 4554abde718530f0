//! Node id derivation from the host's network address

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

use crate::iface::{self, Iface};

/// Where a generator's node id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeIdSource {
    /// Supplied by the caller
    Explicit,
    /// Low byte of this host address
    HostAddress(Ipv4Addr),
    /// No IPv4 address was found and the id defaulted to 0.
    ///
    /// Every host in this state shares node id 0, so their IDs can collide.
    Fallback,
}

impl fmt::Display for NodeIdSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdSource::Explicit => f.write_str("explicit"),
            NodeIdSource::HostAddress(ip) => write!(f, "host address {ip}"),
            NodeIdSource::Fallback => f.write_str("fallback"),
        }
    }
}

/// A node id together with its provenance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedNode {
    pub node_id: i64,
    pub source: NodeIdSource,
}

impl ResolvedNode {
    pub const fn explicit(node_id: i64) -> Self {
        Self {
            node_id,
            source: NodeIdSource::Explicit,
        }
    }

    pub const fn is_fallback(&self) -> bool {
        matches!(self.source, NodeIdSource::Fallback)
    }
}

/// Big-endian value of the last four bytes of an address
pub fn ip_to_u32(ip: IpAddr) -> u32 {
    match ip {
        IpAddr::V4(v4) => u32::from(v4),
        IpAddr::V6(v6) => {
            let o = v6.octets();
            u32::from_be_bytes([o[12], o[13], o[14], o[15]])
        }
    }
}

/// Node id for an address: its lowest byte
pub fn ip_node_id(ip: IpAddr) -> i64 {
    i64::from(ip_to_u32(ip) & 0xff)
}

/// Resolve a node id from the host's primary IPv4 address.
///
/// Never fails: without a usable address the id is 0 and the result is marked
/// [`NodeIdSource::Fallback`].
pub fn resolve_node_id(preferred_iface: &str) -> ResolvedNode {
    from_address(iface::infer_host_ipv4_addr(preferred_iface))
}

/// [`resolve_node_id`] over an already enumerated interface list
pub fn resolve_from_ifaces(ifaces: &[Iface], preferred_iface: &str) -> ResolvedNode {
    from_address(iface::infer_ipv4_in(ifaces, preferred_iface))
}

fn from_address(ip: Option<Ipv4Addr>) -> ResolvedNode {
    match ip {
        Some(ip) => {
            let node_id = ip_node_id(IpAddr::V4(ip));
            tracing::debug!(%ip, node_id, "resolved node id from host address");
            ResolvedNode {
                node_id,
                source: NodeIdSource::HostAddress(ip),
            }
        }
        None => {
            tracing::warn!(
                "no non-loopback IPv4 address found; node id defaults to 0 and may collide with other hosts"
            );
            ResolvedNode {
                node_id: 0,
                source: NodeIdSource::Fallback,
            }
        }
    }
}
