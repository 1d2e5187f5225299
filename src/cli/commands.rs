use std::{net::IpAddr, path::PathBuf};

use clap::{Args, Subcommand};

use crate::utils::export::ExportFormat;

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Result store file (overrides config)
    #[arg(long)]
    pub store: Option<PathBuf>,

    /// JSON log file (overrides config)
    #[arg(long)]
    pub json_log: Option<PathBuf>,

    /// CSV log file (overrides config)
    #[arg(long)]
    pub csv_log: Option<PathBuf>,

    /// Keep stored results in memory only; the log files are still written
    #[arg(long)]
    pub in_memory: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server
    Serve {
        #[command(flatten)]
        common: CommonArgs,

        /// Listen port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Bind to specific interface (overrides config)
        #[arg(short, long)]
        bind: Option<IpAddr>,

        /// Disable CORS headers
        #[arg(long)]
        no_cors: bool,
    },

    /// Run a single speed test and record the result
    Check {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Export the most recent stored results
    Export {
        #[command(flatten)]
        common: CommonArgs,

        /// Export format
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
