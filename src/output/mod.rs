//! Output formatting module.
//!
//! Everything printed around a scan: the header, the final summary in plain
//! or JSON form, and status messages. Per-port lines come from the console
//! sink.

mod json_format;
mod plain;

pub use json_format::print_json;
pub use plain::{
    print_error, print_scan_header, print_services, print_settings, print_summary, print_warning,
};

use crate::cli::OutputFormat;
use crate::scanner::ScanSummary;
use std::io;
use std::path::Path;

/// Print the summary in the requested format.
pub fn format_summary(
    summary: &ScanSummary,
    format: OutputFormat,
    csv: Option<&Path>,
) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_summary(summary, csv),
        OutputFormat::Json => json_format::print_json(summary),
    }
}
