//! CSV persistence of scan results.

use super::Sink;
use crate::error::SinkError;
use crate::scanner::ProbeResult;
use crate::services::service_name;
use crate::types::ScanTarget;
use async_trait::async_trait;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

const HEADER: [&str; 5] = ["timestamp", "host", "port", "service", "status"];

/// Appends one row per result to a CSV file, in arrival order.
///
/// The file is created and the header written by [`CsvSink::create`]; every
/// row is flushed as it is written so a crash mid-scan keeps what was seen.
/// [`Sink::close`] flushes and closes the file; dropping the sink also closes
/// it.
pub struct CsvSink {
    path: PathBuf,
    host: String,
    writer: Mutex<Option<csv::Writer<File>>>,
}

impl CsvSink {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: impl AsRef<Path>, target: &ScanTarget) -> Result<Self, SinkError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(HEADER)?;
        writer.flush()?;

        Ok(Self {
            path,
            host: target.host().to_string(),
            writer: Mutex::new(Some(writer)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<csv::Writer<File>>>, SinkError> {
        self.writer
            .lock()
            .map_err(|_| SinkError::Poisoned(self.name().to_string()))
    }
}

#[async_trait]
impl Sink for CsvSink {
    fn name(&self) -> &str {
        "csv"
    }

    async fn consume(&self, result: &ProbeResult) -> Result<(), SinkError> {
        let timestamp = result.timestamp_iso();
        let port = result.port.to_string();
        let service = service_name(result.port).unwrap_or("");
        let status = result.status().to_string();

        let mut guard = self.lock()?;
        let writer = guard
            .as_mut()
            .ok_or_else(|| SinkError::Closed(self.name().to_string()))?;
        writer.write_record([
            timestamp.as_str(),
            self.host.as_str(),
            port.as_str(),
            service,
            status.as_str(),
        ])?;
        writer.flush()?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        let writer = self.lock()?.take();
        if let Some(mut writer) = writer {
            writer.flush()?;
            debug!(path = %self.path.display(), "csv sink closed");
        }
        Ok(())
    }
}
