//! Result sinks.
//!
//! A sink receives every [`ProbeResult`] as it is produced. Each sink guards
//! its own resource, so one sink never waits on another.

mod console;
mod csv_file;
mod progress;

pub use self::console::ConsoleSink;
pub use self::csv_file::CsvSink;
pub use self::progress::ProgressSink;

use crate::error::SinkError;
use crate::scanner::ProbeResult;
use async_trait::async_trait;
use std::path::PathBuf;

/// A consumer of per-port results.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs and error messages.
    fn name(&self) -> &str;

    /// Record one result. Called exactly once per probed port.
    async fn consume(&self, result: &ProbeResult) -> Result<(), SinkError>;

    /// Flush and release the sink's resource at the end of a scan.
    async fn close(&self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Which built-in sinks a scan should open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkSpec {
    /// Live per-port lines on stdout.
    Console {
        /// Print closed ports as well as open ones.
        show_closed: bool,
    },
    /// One CSV row per result, written to `path`.
    Csv(PathBuf),
    /// A progress bar on stderr.
    Progress,
}

impl SinkSpec {
    /// Sinks holding a file or similar resource are opened first, so a
    /// failure leaves nothing else started.
    pub fn is_stateful(&self) -> bool {
        matches!(self, Self::Csv(_))
    }
}
