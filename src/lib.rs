//! Log viewer with IP-restricted access.
//!
//! Browses, clears, deletes and exports JSON-line log files from a
//! configured directory. Every `/log` route sits behind an allow-list gate
//! that resolves the client address through trusted proxies.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod viewer;

pub use config::ViewerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
