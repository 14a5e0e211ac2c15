//! Client address extraction.
//!
//! Walks `X-Forwarded-For` from the nearest hop back toward the client,
//! peeling off hops that fall inside a trusted proxy network. The first
//! untrusted hop is taken as the client.
//!
//! Known limitation: entries to the left of the first untrusted hop are
//! never inspected, so a client that forges extra hops before a genuine
//! proxy's entry is identified by that genuine entry, not by the forgery.

use std::net::{IpAddr, SocketAddr};

use crate::security::network::NetworkSet;

/// Name of the forwarding header consulted during resolution.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

const IPV6_LOOPBACK: &str = "::1";
const IPV4_LOOPBACK: &str = "127.0.0.1";

/// Resolve the best-effort client address for a request.
///
/// `remote_addr` is the transport peer (`host:port` or a bare host).
/// `forwarded` is the raw forwarding header value, if any. The result is a
/// single address string without a port; it may be unparsable, in which
/// case admission fails closed.
pub fn resolve_client_address(
    remote_addr: &str,
    forwarded: Option<&str>,
    trusted_proxies: &NetworkSet,
) -> String {
    let mut resolved = strip_port(remote_addr.trim()).to_string();
    if resolved == IPV6_LOOPBACK {
        resolved = IPV4_LOOPBACK.to_string();
    }

    if let Some(chain) = forwarded.filter(|value| !value.trim().is_empty()) {
        let untrusted = chain
            .rsplit(',')
            .map(str::trim)
            .find(|hop| !trusted_proxies.contains_str(hop));
        if let Some(hop) = untrusted {
            resolved = hop.to_string();
        }
    }

    strip_port(&resolved).to_string()
}

/// Remove a trailing `:port` from an address.
///
/// Handles `1.2.3.4:80`, `[::1]:80` and `[::1]`. Bare IPv6 addresses such
/// as `2001:db8::1` are returned unchanged.
pub fn strip_port(addr: &str) -> &str {
    if let Some(rest) = addr.strip_prefix('[') {
        return match rest.split_once(']') {
            Some((host, _)) => host,
            None => addr,
        };
    }

    if addr.parse::<IpAddr>().is_ok() {
        return addr;
    }

    match addr.rsplit_once(':') {
        Some((host, _port)) if !host.contains(':') => host,
        _ => addr,
    }
}

/// Render a socket peer the way the resolver expects it.
pub fn peer_string(peer: &SocketAddr) -> String {
    peer.ip().to_canonical().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::network::Network;

    fn trusted(cidrs: &[&str]) -> NetworkSet {
        cidrs.iter().filter_map(|c| Network::parse(c)).collect()
    }

    #[test]
    fn test_peels_trusted_hops() {
        let proxies = trusted(&["10.0.0.0/8"]);
        let ip = resolve_client_address(
            "10.0.0.1:5555",
            Some("203.0.113.5, 10.0.0.9, 10.0.0.1"),
            &proxies,
        );
        assert_eq!(ip, "203.0.113.5");
    }

    #[test]
    fn test_all_trusted_falls_back_to_peer() {
        let proxies = trusted(&["10.0.0.0/8"]);
        let ip = resolve_client_address("198.51.100.7", Some("10.0.0.2"), &proxies);
        assert_eq!(ip, "198.51.100.7");
    }

    #[test]
    fn test_stops_at_first_untrusted() {
        let proxies = trusted(&["10.0.0.0/8"]);
        // The spoofed leftmost entry is never reached.
        let ip = resolve_client_address(
            "10.0.0.1:80",
            Some("127.0.0.1, 198.51.100.20, 10.0.0.3"),
            &proxies,
        );
        assert_eq!(ip, "198.51.100.20");
    }

    #[test]
    fn test_no_trusted_proxies_takes_rightmost() {
        let ip = resolve_client_address("192.0.2.1:80", Some("1.1.1.1, 2.2.2.2"), &NetworkSet::new());
        assert_eq!(ip, "2.2.2.2");
    }

    #[test]
    fn test_loopback_normalized() {
        let ip = resolve_client_address("::1", None, &NetworkSet::new());
        assert_eq!(ip, "127.0.0.1");

        let ip = resolve_client_address("[::1]:8080", None, &NetworkSet::new());
        assert_eq!(ip, "127.0.0.1");
    }

    #[test]
    fn test_empty_header_ignored() {
        let ip = resolve_client_address("192.0.2.9:1000", Some("  "), &NetworkSet::new());
        assert_eq!(ip, "192.0.2.9");
    }

    #[test]
    fn test_hop_port_stripped() {
        let proxies = trusted(&["10.0.0.0/8"]);
        let ip = resolve_client_address("10.0.0.1:80", Some("203.0.113.5:4444, 10.0.0.1"), &proxies);
        assert_eq!(ip, "203.0.113.5");
    }

    #[test]
    fn test_garbage_hop_is_adopted() {
        let proxies = trusted(&["10.0.0.0/8"]);
        let ip = resolve_client_address("10.0.0.1:80", Some("bogus, 10.0.0.1"), &proxies);
        assert_eq!(ip, "bogus");
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("1.2.3.4:80"), "1.2.3.4");
        assert_eq!(strip_port("1.2.3.4"), "1.2.3.4");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("[::1]"), "::1");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
        assert_eq!(strip_port("localhost:3000"), "localhost");
        assert_eq!(strip_port(""), "");
    }

    #[test]
    fn test_peer_string_unmaps_ipv4() {
        let peer: SocketAddr = "[::ffff:192.0.2.4]:9000".parse().unwrap();
        assert_eq!(peer_string(&peer), "192.0.2.4");
    }
}
