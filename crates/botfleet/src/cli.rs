//! Command-line interface definition using clap.

use std::time::Duration;

use botfleet_core::Settings;
use clap::Parser;

/// Botfleet - keeps every active bot in the row store connected
#[derive(Parser, Debug)]
#[command(name = "botfleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Do not start the introspection API
    #[arg(long)]
    pub no_api: bool,

    /// Introspection API port (overrides BOTFLEET_API_PORT)
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Seconds between registry refreshes (overrides BOTFLEET_REFRESH_INTERVAL_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub refresh_interval: Option<u64>,

    /// Row store table holding bot rows (overrides BOTFLEET_BOTS_TABLE)
    #[arg(long)]
    pub bots_table: Option<String>,
}

impl Cli {
    /// Apply command-line overrides on top of environment settings.
    pub fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(port) = self.api_port {
            settings.api_port = port;
        }
        if let Some(secs) = self.refresh_interval {
            settings.refresh_interval = Duration::from_secs(secs);
        }
        if let Some(table) = &self.bots_table {
            settings.bots_table = table.clone();
        }
        settings
    }

    /// Log filter for the chosen verbosity, used when RUST_LOG is unset.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "botfleet=info,teloxide=warn",
            1 => "botfleet=debug,teloxide=info",
            2 => "botfleet=trace,teloxide=debug",
            _ => "trace",
        }
    }
}
