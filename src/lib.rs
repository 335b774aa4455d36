//! # portsweep - a concurrent TCP port scanner
//!
//! portsweep probes one host's TCP ports with a fixed pool of workers,
//! streams every result to its sinks as it arrives, and reports the open
//! ports once all work has drained.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::scanner::{run_scan, ScanConfig};
//! use portsweep::sink::SinkSpec;
//! use portsweep::types::PortList;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let ports: PortList = "20-25,80".parse()?;
//!     let config = ScanConfig::new("127.0.0.1", ports.into_vec(), 4, Duration::from_millis(500))?
//!         .with_sink(SinkSpec::Console { show_closed: false });
//!
//!     let summary = run_scan(config).await?;
//!     println!("open: {:?}", summary.open_ports);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Validated ports and targets
//! - [`scanner`] - Probe, work queue, worker pool, aggregator and coordinator
//! - [`sink`] - Console, CSV and progress-bar result sinks
//! - [`config`] - Persistent settings
//! - [`error`] - Error types
//! - [`output`] - Header and summary formatting
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod sink;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ScanError, SinkError};
pub use scanner::{run_scan, Probe, ProbeResult, ScanConfig, ScanCoordinator, ScanSummary};
pub use sink::{Sink, SinkSpec};
pub use types::{Port, PortList, ScanTarget};
