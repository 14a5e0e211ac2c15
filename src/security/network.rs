//! CIDR networks and the shared compilation cache.
//!
//! # Responsibilities
//! - Parse CIDR strings into immutable [`Network`] values
//! - Memoize parsed networks so repeated policy builds reuse them
//! - Drop malformed entries without failing, reporting them to a hook
//!
//! # Design Decisions
//! - The cache is a value owned by whoever builds policies, not a global
//! - Warm lookups only take a shard read lock; inserts go through the
//!   entry API, which re-checks under the write lock
//! - Entries are never evicted: keys come from configuration, not requests

use dashmap::DashMap;
use ipnet::IpNet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

use crate::observability::metrics;

/// A parsed (base address, prefix length) pair.
///
/// Host bits are cleared on parse, so `192.168.1.7/24` and `192.168.1.0/24`
/// compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network(IpNet);

impl Network {
    /// Parse a CIDR string. Returns `None` for anything that is not a
    /// well-formed `address/prefix` pair.
    pub fn parse(cidr: &str) -> Option<Self> {
        IpNet::from_str(cidr).ok().map(|net| Self(net.trunc()))
    }

    /// Network (base) address.
    pub fn addr(&self) -> IpAddr {
        self.0.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.0.prefix_len()
    }

    /// Check membership. IPv4-mapped IPv6 addresses are compared as IPv4.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.0.contains(&ip.to_canonical())
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr(), self.prefix_len())
    }
}

/// Receives notice of configuration entries that could not be used.
///
/// Decisions never depend on the hook; it exists so operators can spot a
/// misconfigured range.
pub trait DiagnosticHook: Send + Sync {
    /// `list` names the configuration list the entry came from.
    fn entry_dropped(&self, list: &str, entry: &str, reason: &str);
}

/// Default hook: a `warn` event plus a counter.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl DiagnosticHook for LogDiagnostics {
    fn entry_dropped(&self, list: &str, entry: &str, reason: &str) {
        tracing::warn!(list = %list, entry = %entry, reason = %reason, "Ignoring access list entry");
        metrics::record_entry_dropped(list);
    }
}

/// Hook that discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentDiagnostics;

impl DiagnosticHook for SilentDiagnostics {
    fn entry_dropped(&self, _list: &str, _entry: &str, _reason: &str) {}
}

/// A compiled, de-duplicated set of networks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSet {
    networks: Vec<Network>,
}

impl NetworkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a network unless an equal one is already present.
    pub fn insert(&mut self, network: Network) -> bool {
        if self.networks.contains(&network) {
            return false;
        }
        self.networks.push(network);
        true
    }

    /// True if any network in the set contains `ip`.
    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.networks.iter().any(|net| net.contains(ip))
    }

    /// Parse `candidate` and test membership. Unparsable input is never a
    /// member.
    pub fn contains_str(&self, candidate: &str) -> bool {
        match candidate.parse::<IpAddr>() {
            Ok(ip) => self.contains(&ip),
            Err(_) => false,
        }
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

impl FromIterator<Network> for NetworkSet {
    fn from_iter<I: IntoIterator<Item = Network>>(iter: I) -> Self {
        let mut set = NetworkSet::new();
        for network in iter {
            set.insert(network);
        }
        set
    }
}

/// Memoized CIDR parsing, keyed by the literal CIDR string.
///
/// Cloning is cheap and every clone shares the same map.
#[derive(Debug, Clone, Default)]
pub struct NetworkCache {
    inner: Arc<DashMap<String, Network>>,
}

impl NetworkCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the parsed network for `cidr`, parsing and storing it on
    /// first use. Malformed strings return `None` and are not stored.
    pub fn lookup(&self, cidr: &str) -> Option<Network> {
        // Copy out before touching the entry API; holding a read guard
        // across `entry` would deadlock on the same shard.
        let cached = self.inner.get(cidr).map(|hit| *hit.value());
        if cached.is_some() {
            return cached;
        }

        let parsed = Network::parse(cidr)?;

        // Another task may have inserted while we parsed; keep theirs.
        let stored = *self
            .inner
            .entry(cidr.to_string())
            .or_insert(parsed)
            .value();
        Some(stored)
    }

    /// Compile every entry containing `/` into a [`NetworkSet`].
    ///
    /// Entries without `/` are not ranges and are skipped without comment.
    /// Malformed ranges are skipped and reported to `hook`.
    pub fn compile<I, S>(&self, list: &str, entries: I, hook: &dyn DiagnosticHook) -> NetworkSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = NetworkSet::new();
        for entry in entries {
            let entry = entry.as_ref();
            if !entry.contains('/') {
                continue;
            }
            match self.lookup(entry) {
                Some(network) => {
                    set.insert(network);
                }
                None => hook.entry_dropped(list, entry, "malformed CIDR"),
            }
        }
        set
    }

    /// Number of distinct CIDR strings parsed so far.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// True if `cidr` has already been parsed and stored.
    pub fn contains_key(&self, cidr: &str) -> bool {
        self.inner.contains_key(cidr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl DiagnosticHook for Collect {
        fn entry_dropped(&self, _list: &str, entry: &str, _reason: &str) {
            self.0.lock().unwrap().push(entry.to_string());
        }
    }

    #[test]
    fn test_parse_clears_host_bits() {
        let a = Network::parse("192.168.1.7/24").unwrap();
        let b = Network::parse("192.168.1.0/24").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.prefix_len(), 24);
        assert_eq!(a.addr(), "192.168.1.0".parse::<IpAddr>().unwrap());
        assert_eq!(a.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(Network::parse("not-a-cidr/33").is_none());
        assert!(Network::parse("10.0.0.0/33").is_none());
        assert!(Network::parse("10.0.0.1").is_none());
        assert!(Network::parse("").is_none());
    }

    #[test]
    fn test_contains_ipv4_mapped() {
        let net = Network::parse("10.0.0.0/8").unwrap();
        assert!(net.contains(&"10.1.2.3".parse().unwrap()));
        assert!(net.contains(&"::ffff:10.1.2.3".parse().unwrap()));
        assert!(!net.contains(&"11.0.0.1".parse().unwrap()));

        let v6 = Network::parse("2001:db8::/32").unwrap();
        assert!(v6.contains(&"2001:db8::1".parse().unwrap()));
        assert!(!v6.contains(&"10.1.2.3".parse().unwrap()));
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let cache = NetworkCache::new();
        let first = cache.lookup("172.16.0.0/12").unwrap();
        let second = cache.lookup("172.16.0.0/12").unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_malformed_not_cached() {
        let cache = NetworkCache::new();
        assert!(cache.lookup("not-a-cidr/33").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let cache = NetworkCache::new();
        let other = cache.clone();
        cache.lookup("10.0.0.0/8");
        assert!(other.contains_key("10.0.0.0/8"));
    }

    #[test]
    fn test_concurrent_lookups_agree() {
        let cache = NetworkCache::new();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                thread::spawn(move || cache.lookup("198.51.100.0/24").unwrap())
            })
            .collect();

        let results: Vec<Network> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_compile_skips_and_reports() {
        let cache = NetworkCache::new();
        let hook = Collect::default();
        let set = cache.compile(
            "allowed_ips",
            ["192.168.1.0/24", "127.0.0.1", "not-a-cidr/33", "192.168.1.0/24", "10.0.0.0/8"],
            &hook,
        );

        assert_eq!(set.len(), 2);
        assert!(set.contains_str("192.168.1.20"));
        assert!(set.contains_str("10.9.9.9"));
        assert!(!set.contains_str("127.0.0.1"));
        assert_eq!(*hook.0.lock().unwrap(), vec!["not-a-cidr/33".to_string()]);
    }

    #[test]
    fn test_contains_str_unparsable() {
        let set: NetworkSet = [Network::parse("0.0.0.0/0").unwrap()].into_iter().collect();
        assert!(set.contains_str("8.8.8.8"));
        assert!(!set.contains_str("garbage"));
        assert!(!set.contains_str(""));
    }
}
