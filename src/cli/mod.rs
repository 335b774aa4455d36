//! CLI subcommand definitions and handlers.
//!
//! - `portsweep scan <target>` - Scan a target
//! - `portsweep services` - List the well-known service table
//! - `portsweep config` - Show or initialize the settings file

mod config;
mod scan;
mod services;

pub use config::ConfigCommand;
pub use scan::ScanCommand;
pub use services::ServicesCommand;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portsweep - a concurrent TCP connect port scanner.
///
/// Probes a host's ports with a pool of workers, prints each result as it
/// arrives and optionally records every result to a CSV file.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A concurrent TCP connect port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress the header and informational lines
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a settings file (defaults to the user config directory)
    #[arg(long, global = true, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// List well-known ports and their service names
    Services(ServicesCommand),

    /// Show the active settings or write a default settings file
    Config(ConfigCommand),
}

/// Output format for the final summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
        }
    }
}
