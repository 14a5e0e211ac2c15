//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → client_ip.rs (peer address + X-Forwarded-For → client address)
//!     → access_control.rs (allow-list decision)
//!     → Pass to log viewer handlers
//! ```
//!
//! # Design Decisions
//! - Fail closed on decisions: an unparsable address is never admitted
//! - Fail open on configuration: a malformed range is dropped and reported
//! - No trust in forwarding headers beyond declared proxy networks

pub mod access_control;
pub mod client_ip;
pub mod network;

pub use access_control::{is_allowed, AccessDecision, AccessPolicy, AllowEntry, WILDCARD};
pub use client_ip::{resolve_client_address, strip_port, X_FORWARDED_FOR};
pub use network::{DiagnosticHook, LogDiagnostics, Network, NetworkCache, NetworkSet, SilentDiagnostics};
