//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, connection limit > 0)
//! - Reject fallback pages that escape the served directory
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: HostConfig → Result<(), Vec<ValidationError>>
//! - Directory existence is checked at startup, not here

use std::net::SocketAddr;
use std::path::{Component, Path};

use thiserror::Error;

use crate::config::schema::HostConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must be a plain relative path inside the served directory, got {value:?}")]
    EscapingPath { field: &'static str, value: String },

    #[error("observability.metrics_address is not a socket address: {0:?}")]
    MetricsAddress(String),

    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

/// Check `config` and collect every violation.
pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.limits.max_connections == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.max_connections",
        });
    }
    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero {
            field: "limits.request_timeout_secs",
        });
    }

    for (field, value) in [
        ("bundle.fallback", &config.bundle.fallback),
        ("dev.fallback", &config.dev.fallback),
    ] {
        if !is_contained(value) {
            errors.push(ValidationError::EscapingPath {
                field,
                value: value.clone(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_contained(value: &str) -> bool {
    let path = Path::new(value);
    !value.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)))
}
