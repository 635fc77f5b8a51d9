//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the host.
//! All types derive Serde traits for deserialization from config files.
//! Listening ports and the isolation header policy are deliberately absent.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Production bundle settings.
    pub bundle: BundleConfig,

    /// Development server settings.
    pub dev: DevConfig,

    /// Connection and request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Pre-built application bundle served by the production host.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Bundle directory (e.g., "build").
    pub dir: PathBuf,

    /// Page served for paths with no matching file, relative to `dir`.
    pub fallback: String,

    /// Serve `.br` / `.gz` siblings when the client accepts them.
    pub precompressed: bool,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("build"),
            fallback: "index.html".to_string(),
            precompressed: true,
        }
    }
}

/// Development server settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DevConfig {
    /// Directory served and watched for changes.
    pub root: PathBuf,

    /// Page served for paths with no matching file, relative to `root`.
    pub fallback: String,

    /// Enable file watching and the live-reload channel.
    pub live_reload: bool,

    /// Extra path components ignored by the watcher.
    pub ignore: Vec<String>,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            fallback: "index.html".to_string(),
            live_reload: true,
            ignore: Vec::new(),
        }
    }
}

/// Connection and request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Time allowed for in-flight connections to drain on shutdown.
    pub shutdown_grace_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_connections: 10_000,
            request_timeout_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
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
