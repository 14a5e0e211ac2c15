//! Address-based admission control.
//!
//! # Data Flow
//! ```text
//! AccessConfig (strings)
//!     → AccessPolicy::from_config (compile via NetworkCache)
//!     → AccessPolicy::check(peer, X-Forwarded-For)
//!         → resolve_client_address
//!         → is_allowed
//!     → AccessDecision
//! ```
//!
//! # Design Decisions
//! - Disabled policies short-circuit before any resolution work
//! - Unparsable client addresses are always denied
//! - Malformed configuration entries are dropped, never fatal

use std::net::IpAddr;

use crate::config::AccessConfig;
use crate::security::client_ip::resolve_client_address;
use crate::security::network::{DiagnosticHook, Network, NetworkCache, NetworkSet};

/// Allow-list entry that admits every parsable address.
pub const WILDCARD: &str = "*";

/// One compiled allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowEntry {
    /// Literal address, compared by exact string equality.
    Exact(String),
    /// CIDR range.
    Range(Network),
    /// The `*` marker.
    Wildcard,
}

/// Outcome of running a request through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// Restriction disabled; nothing was resolved.
    Bypassed,
    Allowed { client_ip: String },
    Denied { client_ip: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, AccessDecision::Denied { .. })
    }

    /// Resolved client address, if resolution ran.
    pub fn client_ip(&self) -> Option<&str> {
        match self {
            AccessDecision::Bypassed => None,
            AccessDecision::Allowed { client_ip } | AccessDecision::Denied { client_ip } => {
                Some(client_ip.as_str())
            }
        }
    }
}

/// Resolved access configuration for a guarded route group.
///
/// Built once when the router is assembled, then shared read-only.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    enabled: bool,
    allowed: Vec<AllowEntry>,
    trusted_proxies: NetworkSet,
}

impl AccessPolicy {
    /// Compile a policy from raw configuration strings.
    pub fn from_config(
        config: &AccessConfig,
        cache: &NetworkCache,
        hook: &dyn DiagnosticHook,
    ) -> Self {
        let mut allowed = Vec::with_capacity(config.allowed_ips.len());
        for raw in &config.allowed_ips {
            if raw == WILDCARD {
                allowed.push(AllowEntry::Wildcard);
            } else if raw.contains('/') {
                match cache.lookup(raw) {
                    Some(network) => {
                        tracing::debug!(network = %network, "Allowed range compiled");
                        allowed.push(AllowEntry::Range(network));
                    }
                    None => hook.entry_dropped("allowed_ips", raw, "malformed CIDR"),
                }
            } else {
                allowed.push(AllowEntry::Exact(raw.clone()));
            }
        }

        for raw in config.trusted_proxies.iter().filter(|p| !p.contains('/')) {
            hook.entry_dropped("trusted_proxies", raw, "not a CIDR range");
        }
        let trusted_proxies = cache.compile("trusted_proxies", &config.trusted_proxies, hook);

        tracing::debug!(
            enabled = config.enabled,
            allowed_entries = allowed.len(),
            trusted_proxies = trusted_proxies.len(),
            "Access policy compiled"
        );

        Self {
            enabled: config.enabled,
            allowed,
            trusted_proxies,
        }
    }

    /// A policy that admits everything.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn allowed_entries(&self) -> &[AllowEntry] {
        &self.allowed
    }

    pub fn trusted_proxies(&self) -> &NetworkSet {
        &self.trusted_proxies
    }

    /// Run the gate for one request.
    pub fn check(&self, remote_addr: &str, forwarded: Option<&str>) -> AccessDecision {
        if !self.enabled {
            return AccessDecision::Bypassed;
        }

        let client_ip = resolve_client_address(remote_addr, forwarded, &self.trusted_proxies);
        if is_allowed(&client_ip, &self.allowed) {
            AccessDecision::Allowed { client_ip }
        } else {
            AccessDecision::Denied { client_ip }
        }
    }
}

/// Decide whether `address` is admitted by `entries`.
///
/// Literal and wildcard entries are checked before ranges.
pub fn is_allowed(address: &str, entries: &[AllowEntry]) -> bool {
    let Ok(ip) = address.parse::<IpAddr>() else {
        return false;
    };

    let literal = entries.iter().any(|entry| match entry {
        AllowEntry::Exact(allowed) => allowed == address,
        AllowEntry::Wildcard => true,
        AllowEntry::Range(_) => false,
    });
    if literal {
        return true;
    }

    entries.iter().any(|entry| match entry {
        AllowEntry::Range(network) => network.contains(&ip),
        _ => false,
    })
}
