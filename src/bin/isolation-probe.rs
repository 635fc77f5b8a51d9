//! Command-line check for a running host.
//!
//! Requests each path and prints whether the response carried the
//! cross-origin isolation headers. Exits with status 1 when any path fails.

use clap::Parser;

use imgconv_host::security::check::{all_isolated, check_paths};

#[derive(Parser)]
#[command(name = "isolation-probe")]
#[command(about = "Check that a running host sends the cross-origin isolation headers", long_about = None)]
struct Cli {
    /// Base URL of the host.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Paths to request.
    #[arg(default_value = "/")]
    paths: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let reports = check_paths(&client, &cli.url, &cli.paths).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for r in &reports {
            if r.isolated {
                println!("ok    {} {}", r.status, r.path);
            } else {
                println!("FAIL  {} {} (missing or wrong: {})", r.status, r.path, r.violations.join(", "));
            }
        }
    }

    if !all_isolated(&reports) {
        std::process::exit(1);
    }
    Ok(())
}
