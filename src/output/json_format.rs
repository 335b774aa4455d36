//! JSON output formatting.

use crate::scanner::ScanSummary;
use std::io;

/// Print the summary as pretty JSON.
pub fn print_json(summary: &ScanSummary) -> io::Result<()> {
    let json = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    println!("{}", json);
    Ok(())
}
