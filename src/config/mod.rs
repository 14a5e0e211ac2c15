//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ViewerConfig (validated, immutable)
//!     → AccessPolicy / LogStore built once at router setup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AccessConfig, ListenerConfig, LogDirConfig, ObservabilityConfig, SecurityConfig,
    TimeoutConfig, ViewerConfig,
};
pub use validation::{validate_config, ValidationError};
