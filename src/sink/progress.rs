//! Progress bar sink.

use super::Sink;
use crate::error::SinkError;
use crate::scanner::ProbeResult;
use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Advances a progress bar once per result and names the latest open port.
pub struct ProgressSink {
    bar: ProgressBar,
}

impl ProgressSink {
    /// A bar sized for `total` results, drawn on stderr.
    pub fn new(total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        // A bad template only loses styling, never the bar.
        if let Ok(style) = ProgressStyle::default_bar().template(TEMPLATE) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self { bar }
    }

    /// Wrap an existing bar, e.g. a hidden one in tests.
    pub fn with_bar(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

#[async_trait]
impl Sink for ProgressSink {
    fn name(&self) -> &str {
        "progress"
    }

    async fn consume(&self, result: &ProbeResult) -> Result<(), SinkError> {
        self.bar.inc(1);
        if result.is_open {
            self.bar
                .set_message(format!("Found open port: {}", result.port));
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), SinkError> {
        self.bar.finish_with_message("Scan complete");
        Ok(())
    }
}
