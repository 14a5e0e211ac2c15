//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the viewer.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the log viewer.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ViewerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Log directory and feature switches.
    pub viewer: LogDirConfig,

    /// IP restriction for the `/log` routes.
    pub access: AccessConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Where logs live and which destructive operations are exposed.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogDirConfig {
    /// Directory holding the log files.
    pub log_dir: String,

    /// Development mode. Clear and delete only work when this is set.
    pub dev_mode: bool,

    /// Allow deleting every file in `log_dir`.
    pub enable_delete: bool,

    /// Allow downloading a file's raw contents.
    pub enable_export: bool,

    /// Allow truncating a file.
    pub enable_clear: bool,

    /// Entries per page in the browser UI.
    pub page_size: usize,
}

impl Default for LogDirConfig {
    fn default() -> Self {
        Self {
            log_dir: "./log".to_string(),
            dev_mode: false,
            enable_delete: false,
            enable_export: true,
            enable_clear: false,
            page_size: 10,
        }
    }
}

/// IP restriction settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Enable IP restriction. When off every client is admitted.
    pub enabled: bool,

    /// Literal addresses, CIDR ranges, or `*`.
    pub allowed_ips: Vec<String>,

    /// CIDR ranges of proxies whose `X-Forwarded-For` entries are trusted.
    pub trusted_proxies: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            allowed_ips: vec!["127.0.0.1".to_string()],
            trusted_proxies: Vec::new(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
