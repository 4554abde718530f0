//! Host network interface enumeration and primary-address selection

use std::net::{IpAddr, Ipv4Addr};

use thiserror::Error;

/// Interface name prefixes conventionally used for the primary NIC
pub const PRIMARY_PREFIXES: &[&str] = &["en", "eth"];

/// Names preferred when several primary candidates remain
pub const CANONICAL_PRIMARY: &[&str] = &["en0", "eth0"];

/// Failure to query the operating system for its interfaces
#[derive(Debug, Error)]
pub enum IfaceError {
    #[error("failed to enumerate network interfaces: {0}")]
    Query(#[from] local_ip_address::Error),
}

/// Address families to keep when listing interfaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListMode {
    #[default]
    All,
    Ipv4,
    Ipv6,
}

impl ListMode {
    fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            ListMode::All => true,
            ListMode::Ipv4 => ip.is_ipv4(),
            ListMode::Ipv6 => ip.is_ipv6(),
        }
    }
}

/// How interface names are compared against a list of wanted names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Prefix,
    Exactly,
}

impl MatchMode {
    /// An empty name list matches every interface
    pub fn matches(self, names: &[&str], name: &str) -> bool {
        if names.is_empty() {
            return true;
        }
        names.iter().any(|wanted| match self {
            MatchMode::Prefix => name.starts_with(wanted),
            MatchMode::Exactly => name == *wanted,
        })
    }
}

/// One address bound to a named interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Iface {
    pub ip: IpAddr,
    pub name: String,
}

impl Iface {
    pub fn new(ip: impl Into<IpAddr>, name: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            name: name.into(),
        }
    }

    fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        }
    }
}

/// List the host's non-loopback addresses of the requested families
pub fn list_ifaces(mode: ListMode) -> Result<Vec<Iface>, IfaceError> {
    let raw = local_ip_address::list_afinet_netifas()?;
    Ok(filter_ifaces(raw, mode))
}

/// Drop loopback addresses and families `mode` does not accept
pub fn filter_ifaces<I>(raw: I, mode: ListMode) -> Vec<Iface>
where
    I: IntoIterator<Item = (String, IpAddr)>,
{
    raw.into_iter()
        .filter(|(_, ip)| !ip.is_loopback() && mode.accepts(ip))
        .map(|(name, ip)| Iface { ip, name })
        .collect()
}

/// Host IPv4 addresses on interfaces whose names match `names`
pub fn host_ipv4(mode: MatchMode, names: &[&str]) -> Result<Vec<Ipv4Addr>, IfaceError> {
    let ifaces = list_ifaces(ListMode::Ipv4)?;
    Ok(select_ipv4(&ifaces, mode, names)
        .into_iter()
        .filter_map(Iface::ipv4)
        .collect())
}

fn select_ipv4<'a>(ifaces: &'a [Iface], mode: MatchMode, names: &[&str]) -> Vec<&'a Iface> {
    ifaces
        .iter()
        .filter(|iface| iface.ip.is_ipv4() && mode.matches(names, &iface.name))
        .collect()
}

/// Pick the primary IPv4 address out of `ifaces`.
///
/// Preference order: `preferred` matched exactly, then by prefix, then the
/// conventional primary prefixes, then anything. Ties among several candidates
/// go to the canonical primary names, else to the first candidate.
pub fn infer_ipv4_in(ifaces: &[Iface], preferred: &str) -> Option<Ipv4Addr> {
    if !preferred.is_empty() {
        for mode in [MatchMode::Exactly, MatchMode::Prefix] {
            if let Some(iface) = select_ipv4(ifaces, mode, &[preferred]).first() {
                return iface.ipv4();
            }
        }
    }

    let mut candidates = select_ipv4(ifaces, MatchMode::Prefix, PRIMARY_PREFIXES);
    if candidates.is_empty() {
        candidates = select_ipv4(ifaces, MatchMode::Prefix, &[]);
    }

    if candidates.len() > 1 {
        if let Some(iface) = candidates
            .iter()
            .find(|iface| MatchMode::Prefix.matches(CANONICAL_PRIMARY, &iface.name))
        {
            return iface.ipv4();
        }
    }

    candidates.first().and_then(|iface| iface.ipv4())
}

/// Infer the host's primary IPv4 address, empty when there is none.
///
/// Enumeration failures are logged and treated as "no address".
pub fn infer_host_ipv4(preferred: &str) -> String {
    infer_ipv4_string(&host_ifaces(), preferred)
}

/// Dotted-quad form of [`infer_ipv4_in`], empty when there is no address
pub fn infer_ipv4_string(ifaces: &[Iface], preferred: &str) -> String {
    infer_ipv4_in(ifaces, preferred)
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

pub(crate) fn infer_host_ipv4_addr(preferred: &str) -> Option<Ipv4Addr> {
    infer_ipv4_in(&host_ifaces(), preferred)
}

fn host_ifaces() -> Vec<Iface> {
    list_ifaces(ListMode::Ipv4).unwrap_or_else(|err| {
        tracing::warn!(error = %err, "interface enumeration failed");
        Vec::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv6Addr;

    fn v4(a: u8, b: u8, c: u8, d: u8, name: &str) -> Iface {
        Iface::new(Ipv4Addr::new(a, b, c, d), name)
    }

    #[test]
    fn test_conventional_prefix_beats_wireless() {
        let ifaces = [v4(192, 168, 1, 5, "wlan0"), v4(10, 0, 0, 2, "eth0")];
        assert_eq!(
            infer_ipv4_in(&ifaces, ""),
            Some(Ipv4Addr::new(10, 0, 0, 2))
        );
    }

    #[test]
    fn test_lone_interface_is_chosen() {
        let ifaces = [v4(192, 168, 1, 5, "wlan0")];
        assert_eq!(
            infer_ipv4_in(&ifaces, ""),
            Some(Ipv4Addr::new(192, 168, 1, 5))
        );
    }

    #[test]
    fn test_empty_list_yields_none() {
        assert_eq!(infer_ipv4_in(&[], ""), None);
        assert_eq!(infer_ipv4_in(&[], "eth0"), None);
    }

    #[test]
    fn test_no_address_infers_empty_string() {
        assert_eq!(infer_ipv4_string(&[], ""), "");
        assert_eq!(infer_ipv4_string(&[], "eth0"), "");
        let v6_only = [Iface::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1), "eth0")];
        assert_eq!(infer_ipv4_string(&v6_only, ""), "");
        assert_eq!(
            infer_ipv4_string(&[v4(10, 0, 0, 2, "eth0")], ""),
            "10.0.0.2"
        );
    }

    #[test]
    fn test_preferred_exact_beats_prefix() {
        let ifaces = [
            v4(10, 0, 0, 9, "bond0.100"),
            v4(10, 0, 0, 8, "bond0"),
            v4(10, 0, 0, 2, "eth0"),
        ];
        assert_eq!(
            infer_ipv4_in(&ifaces, "bond0"),
            Some(Ipv4Addr::new(10, 0, 0, 8))
        );
    }

    #[test]
    fn test_preferred_prefix_match() {
        let ifaces = [v4(10, 0, 0, 2, "eth0"), v4(10, 0, 0, 9, "bond0.100")];
        assert_eq!(
            infer_ipv4_in(&ifaces, "bond"),
            Some(Ipv4Addr::new(10, 0, 0, 9))
        );
    }

    #[test]
    fn test_unmatched_preference_falls_through() {
        let ifaces = [v4(192, 168, 1, 5, "wlan0"), v4(10, 0, 0, 2, "en5")];
        assert_eq!(
            infer_ipv4_in(&ifaces, "ib0"),
            Some(Ipv4Addr::new(10, 0, 0, 2))
        );
    }

    #[test]
    fn test_canonical_name_breaks_ties() {
        let ifaces = [
            v4(10, 0, 1, 1, "eth1"),
            v4(10, 0, 0, 1, "eth0"),
            v4(10, 0, 2, 1, "enp3s0"),
        ];
        assert_eq!(
            infer_ipv4_in(&ifaces, ""),
            Some(Ipv4Addr::new(10, 0, 0, 1))
        );
    }

    #[test]
    fn test_first_candidate_without_canonical_name() {
        let ifaces = [v4(172, 16, 0, 1, "wlan0"), v4(172, 16, 0, 2, "docker0")];
        assert_eq!(
            infer_ipv4_in(&ifaces, ""),
            Some(Ipv4Addr::new(172, 16, 0, 1))
        );
    }

    #[test]
    fn test_ipv6_only_interfaces_are_ignored() {
        let ifaces = [Iface::new(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1), "eth0")];
        assert_eq!(infer_ipv4_in(&ifaces, ""), None);
    }

    #[test]
    fn test_filter_drops_loopback_and_filters_family() {
        let raw = vec![
            ("lo".to_string(), IpAddr::V4(Ipv4Addr::LOCALHOST)),
            ("lo".to_string(), IpAddr::V6(Ipv6Addr::LOCALHOST)),
            ("eth0".to_string(), IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))),
            (
                "eth0".to_string(),
                IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 2)),
            ),
        ];

        let all = filter_ifaces(raw.clone(), ListMode::All);
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|iface| iface.name == "eth0"));

        let only_v4 = filter_ifaces(raw.clone(), ListMode::Ipv4);
        assert_eq!(only_v4, vec![v4(10, 0, 0, 2, "eth0")]);

        let only_v6 = filter_ifaces(raw, ListMode::Ipv6);
        assert_eq!(only_v6.len(), 1);
        assert!(only_v6[0].ip.is_ipv6());
    }

    #[test]
    fn test_match_mode() {
        assert!(MatchMode::Prefix.matches(&[], "anything"));
        assert!(MatchMode::Exactly.matches(&[], "anything"));
        assert!(MatchMode::Prefix.matches(&["en", "eth"], "enp0s3"));
        assert!(!MatchMode::Prefix.matches(&["en", "eth"], "wlan0"));
        assert!(MatchMode::Exactly.matches(&["eth0"], "eth0"));
        assert!(!MatchMode::Exactly.matches(&["eth0"], "eth0.100"));
    }
}
