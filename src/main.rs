//! Host for the image-conversion web app.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ net::listener ──▶ net::connection ──▶ http::server
//!                                                              │
//!                                       security::isolation ◀──┘ (outermost layer)
//!                                                              │
//!                                      ┌───────────────────────┴──────────────┐
//!                                      ▼                                      ▼
//!                              http::bundle (serve)                   dev (dev server)
//!                              static files, fallback               source root, live reload
//! ```
//!
//! Both paths return every response with
//! `Cross-Origin-Embedder-Policy: require-corp` and
//! `Cross-Origin-Opener-Policy: same-origin`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use imgconv_host::config::load_or_default;
use imgconv_host::lifecycle::{signals, startup, Shutdown};
use imgconv_host::observability::logging;

#[derive(Parser)]
#[command(name = "imgconv-host", version)]
#[command(about = "Cross-origin isolated host for the image converter", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the pre-built bundle on port 3000
    Serve {
        /// Bundle directory (overrides config)
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
    /// Serve the source root on port 5173 with live reload
    Dev {
        /// Source root (overrides config)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Disable file watching and live reload
        #[arg(long)]
        no_reload: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut config = load_or_default(cli.config.as_deref())?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!("imgconv-host v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    signals::install(shutdown.clone());

    match cli.command {
        Commands::Serve { bundle } => {
            if let Some(dir) = bundle {
                config.bundle.dir = dir;
            }
            startup::run_production(config, &shutdown).await?;
        }
        Commands::Dev { root, no_reload } => {
            if let Some(root) = root {
                config.dev.root = root;
            }
            if no_reload {
                config.dev.live_reload = false;
            }
            startup::run_dev(config, &shutdown).await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
