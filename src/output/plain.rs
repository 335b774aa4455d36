//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::config::AppSettings;
use crate::scanner::ScanSummary;
use crate::services::COMMON_SERVICES;
use crate::types::Port;
use console::style;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

/// Print the banner shown before scanning begins.
pub fn print_scan_header(
    host: &str,
    ports: usize,
    workers: usize,
    timeout: Duration,
    csv: Option<&Path>,
) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("portsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(host).white().bold()
    );
    println!(
        "{} Scanning {} ports with {} workers (timeout {}ms)",
        style("•").dim(),
        style(ports).white().bold(),
        workers,
        timeout.as_millis()
    );
    match csv {
        Some(path) => println!(
            "{} Results will be saved to: {}",
            style("•").dim(),
            path.display()
        ),
        None => println!(
            "{} CSV saving disabled, results will be printed only",
            style("•").dim()
        ),
    }
    println!();
}

/// Print the end-of-scan summary.
pub fn print_summary(summary: &ScanSummary, csv: Option<&Path>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    writeln!(
        out,
        "{} {} ports scanned in {:.2}s",
        style("Scan complete.").cyan().bold(),
        summary.ports_scanned,
        summary.duration_ms as f64 / 1000.0
    )?;

    if summary.open_ports.is_empty() {
        writeln!(out, "{}", style("No open ports found.").red())?;
    } else {
        writeln!(
            out,
            "{}",
            style(format!("Open ports: {}", format_port_list(&summary.open_ports)))
                .green()
                .bold()
        )?;
    }

    match csv {
        Some(path) => writeln!(out, "Saved results to: {}", path.display())?,
        None => writeln!(out, "No CSV file was written.")?,
    }

    if summary.sink_failures > 0 {
        writeln!(
            out,
            "{} {} result writes failed (see log)",
            style("Warning:").yellow().bold(),
            summary.sink_failures
        )?;
    }

    Ok(())
}

/// Print the well-known service table.
pub fn print_services() -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "{:>6}  {}", style("PORT").bold(), style("SERVICE").bold())?;
    for (port, name) in COMMON_SERVICES {
        writeln!(out, "{:>6}  {}", port, name)?;
    }
    Ok(())
}

/// Print the active settings and the file they belong to.
pub fn print_settings(file: &Path, settings: &AppSettings) -> io::Result<()> {
    let json = serde_json::to_string_pretty(settings).map_err(io::Error::other)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let note = if file.exists() { "" } else { " (not created, showing defaults)" };
    writeln!(out, "{} {}{}", style("Settings file:").bold(), file.display(), note)?;
    writeln!(out, "{json}")?;
    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Render ports as `[22, 80, 443]`.
fn format_port_list(ports: &[Port]) -> String {
    let joined = ports
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", joined)
}
