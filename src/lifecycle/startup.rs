//! Startup orchestration.
//!
//! # Responsibilities
//! - Check the served directory exists
//! - Start background tasks (metrics exporter, source watcher)
//! - Bind the fixed address and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Ports are fixed; only ambient concerns come from config

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;

use crate::config::HostConfig;
use crate::dev::{self, ReloadHub, SourceWatcher};
use crate::error::HostError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::Listener;
use crate::observability::metrics;
use crate::security::isolation::PLUGIN_NAME;

/// Production port.
pub const PRODUCTION_PORT: u16 = 3000;

/// Development port.
pub const DEV_PORT: u16 = 5173;

/// Production listens on every interface.
pub const PRODUCTION_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, PRODUCTION_PORT));

/// Development stays on loopback.
pub const DEV_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, DEV_PORT));

fn require_dir(path: &Path) -> Result<(), HostError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(HostError::MissingDirectory(path.to_path_buf()))
    }
}

fn start_metrics(config: &HostConfig) -> Result<(), HostError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| HostError::Metrics(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }
    Ok(())
}

/// Serve the pre-built bundle on [`PRODUCTION_ADDR`] until `shutdown` fires.
pub async fn run_production(config: HostConfig, shutdown: &Shutdown) -> Result<(), HostError> {
    require_dir(&config.bundle.dir)?;
    start_metrics(&config)?;

    tracing::info!(
        bundle = %config.bundle.dir.display(),
        fallback = %config.bundle.fallback,
        precompressed = config.bundle.precompressed,
        "Serving production bundle"
    );

    let listener = Listener::bind(PRODUCTION_ADDR, config.limits.max_connections).await?;
    HttpServer::production(config)
        .run(listener, shutdown.subscribe())
        .await
}

/// Serve the source root on [`DEV_ADDR`] with live reload until `shutdown` fires.
pub async fn run_dev(config: HostConfig, shutdown: &Shutdown) -> Result<(), HostError> {
    require_dir(&config.dev.root)?;
    start_metrics(&config)?;

    let (hub, _watcher) = if config.dev.live_reload {
        let hub = ReloadHub::default();
        let watcher = SourceWatcher::new(&config.dev.root, &config.dev.ignore, hub.clone()).run()?;
        (Some(hub), Some(watcher))
    } else {
        (None, None)
    };

    tracing::info!(
        root = %config.dev.root.display(),
        live_reload = config.dev.live_reload,
        plugin = PLUGIN_NAME,
        "Serving development root"
    );

    let handler = dev::router(&config.dev, hub);
    let listener = Listener::bind(DEV_ADDR, config.limits.max_connections).await?;
    HttpServer::new(config, handler)
        .run(listener, shutdown.subscribe())
        .await
}
