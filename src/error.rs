//! Top-level error type for host startup and serving.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::net::listener::ListenerError;

/// Errors that abort a host before or while serving.
#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("directory {0} does not exist")]
    MissingDirectory(PathBuf),

    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),

    #[error("metrics exporter failed: {0}")]
    Metrics(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
