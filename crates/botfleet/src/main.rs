//! Botfleet daemon binary.
//!
//! Start the daemon with:
//! ```bash
//! SUPABASE_URL=https://xyz.supabase.co SUPABASE_SERVICE_ROLE_KEY=xxx cargo run -p botfleet
//! ```

mod app;
mod cli;
mod signals;

use std::process::ExitCode;

use botfleet_core::{load_env_files, Settings};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config dir first, then .env.local / .env; real env vars always win.
    let loaded = load_env_files();

    // RUST_LOG overrides the -v level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(cli.log_filter()))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    for path in &loaded {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let settings = match Settings::from_env() {
        Ok(settings) => cli.apply(settings),
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            eprintln!("botfleet: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match app::run(&cli, settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "botfleet failed");
            eprintln!("botfleet: {}", e);
            ExitCode::FAILURE
        }
    }
}
