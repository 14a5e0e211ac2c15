//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Malformed access ranges are not errors; the policy drops them
//! - Validation is pure function: ViewerConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ViewerConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidAddress { field: &'static str, value: String },
    EmptyLogDir,
    ZeroValue(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidAddress { field, value } => {
                write!(f, "{} is not a socket address: {:?}", field, value)
            }
            ValidationError::EmptyLogDir => write!(f, "viewer.log_dir must not be empty"),
            ValidationError::ZeroValue(field) => write!(f, "{} must be greater than zero", field),
        }
    }
}

pub fn validate_config(config: &ViewerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.viewer.log_dir.trim().is_empty() {
        errors.push(ValidationError::EmptyLogDir);
    }
    if config.viewer.page_size == 0 {
        errors.push(ValidationError::ZeroValue("viewer.page_size"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroValue("security.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(validate_config(&ViewerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ViewerConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.viewer.log_dir = " ".into();
        config.viewer.page_size = 0;
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.contains(&ValidationError::EmptyLogDir));
        assert!(errors.contains(&ValidationError::ZeroValue("viewer.page_size")));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ViewerConfig::default();
        config.observability.metrics_address = "bad".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_malformed_cidr_is_not_an_error() {
        let mut config = ViewerConfig::default();
        config.access.allowed_ips.push("not-a-cidr/33".into());
        assert!(validate_config(&config).is_ok());
    }
}
