//! Scan subcommand implementation.
//!
//! Handles the `portsweep scan <target>` command.

use crate::cli::OutputFormat;
use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output;
use crate::scanner::{run_scan, ScanConfig};
use crate::sink::SinkSpec;
use crate::types::{PortList, ScanTarget};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Scan a target for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP address or hostname)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan: "common", "80", "80,443", "1-1024", "22,80,8000-8100"
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Number of concurrent workers
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Connection timeout in milliseconds
    #[arg(short = 't', long)]
    pub timeout: Option<u64>,

    /// Write results to this CSV file
    #[arg(long, value_name = "PATH", conflicts_with = "no_csv")]
    pub csv: Option<PathBuf>,

    /// Do not write a CSV file
    #[arg(long)]
    pub no_csv: bool,

    /// Only print open ports as they are found
    #[arg(long)]
    pub open_only: bool,

    /// Show a progress bar instead of per-port lines
    #[arg(long)]
    pub progress: bool,

    /// Output format for the final summary
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

/// Scan parameters after merging flags over settings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedScan {
    ports: PortList,
    concurrency: usize,
    timeout: Duration,
    csv: Option<PathBuf>,
    show_closed: bool,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let target = ScanTarget::parse(&self.target)?;
        let resolved = self.resolve(settings)?;
        let config = self.build_config(&target, &resolved)?;
        let plain = self.output == OutputFormat::Plain;

        if !quiet && plain {
            output::print_scan_header(
                target.host(),
                resolved.ports.len(),
                resolved.concurrency,
                resolved.timeout,
                resolved.csv.as_deref(),
            );
        }

        let summary = run_scan(config).await?;

        if summary.sink_failures > 0 && !plain {
            output::print_warning(&format!(
                "{} result writes failed during the scan",
                summary.sink_failures
            ));
        }
        output::format_summary(&summary, self.output, resolved.csv.as_deref())?;

        Ok(())
    }

    /// Merge command-line flags over stored settings.
    fn resolve(&self, settings: &AppSettings) -> CliResult<ResolvedScan> {
        let ports: PortList = self
            .ports
            .as_deref()
            .unwrap_or(&settings.default_ports)
            .parse()?;

        let csv = if self.no_csv {
            None
        } else if let Some(path) = &self.csv {
            Some(path.clone())
        } else if settings.save_csv {
            Some(settings.csv_path.clone())
        } else {
            None
        };

        let timeout_ms = self.timeout.unwrap_or(settings.default_timeout_ms);

        Ok(ResolvedScan {
            ports,
            concurrency: self.concurrency.unwrap_or(settings.default_concurrency),
            timeout: Duration::from_millis(timeout_ms),
            csv,
            show_closed: settings.show_closed && !self.open_only,
        })
    }

    fn build_config(&self, target: &ScanTarget, resolved: &ResolvedScan) -> CliResult<ScanConfig> {
        let mut config = ScanConfig::new(
            target.host(),
            resolved.ports.ports().to_vec(),
            resolved.concurrency,
            resolved.timeout,
        )?;

        // Stay silent on stdout when it carries JSON.
        if self.output == OutputFormat::Plain {
            config = if self.progress {
                config.with_sink(SinkSpec::Progress)
            } else {
                config.with_sink(SinkSpec::Console {
                    show_closed: resolved.show_closed,
                })
            };
        }
        if let Some(path) = &resolved.csv {
            config = config.with_sink(SinkSpec::Csv(path.clone()));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::{CliError, ScanError};
    use clap::Parser;

    fn scan_args(args: &[&str]) -> ScanCommand {
        let mut argv = vec!["portsweep", "scan"];
        argv.extend_from_slice(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Scan(scan) => scan,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let cmd = scan_args(&["127.0.0.1"]);
        let resolved = cmd.resolve(&AppSettings::default()).unwrap();

        assert_eq!(resolved.ports, PortList::common());
        assert_eq!(resolved.concurrency, 50);
        assert_eq!(resolved.timeout, Duration::from_millis(500));
        assert_eq!(resolved.csv, Some(PathBuf::from("scan_results.csv")));
        assert!(resolved.show_closed);
    }

    #[test]
    fn test_flags_override_settings() {
        let cmd = scan_args(&[
            "127.0.0.1", "-p", "1-10", "-c", "8", "-t", "250", "--csv", "out.csv", "--open-only",
        ]);
        let resolved = cmd.resolve(&AppSettings::default()).unwrap();

        assert_eq!(resolved.ports.len(), 10);
        assert_eq!(resolved.concurrency, 8);
        assert_eq!(resolved.timeout, Duration::from_millis(250));
        assert_eq!(resolved.csv, Some(PathBuf::from("out.csv")));
        assert!(!resolved.show_closed);
    }

    #[test]
    fn test_no_csv_wins() {
        let cmd = scan_args(&["127.0.0.1", "--no-csv"]);
        assert_eq!(cmd.resolve(&AppSettings::default()).unwrap().csv, None);
    }

    #[test]
    fn test_invalid_ports_rejected() {
        let cmd = scan_args(&["127.0.0.1", "-p", "70000"]);
        assert!(matches!(
            cmd.resolve(&AppSettings::default()),
            Err(CliError::Port(_))
        ));
    }

    #[test]
    fn test_zero_concurrency_rejected_before_scan() {
        let cmd = scan_args(&["127.0.0.1", "-c", "0", "--no-csv"]);
        let target = ScanTarget::parse(&cmd.target).unwrap();
        let resolved = cmd.resolve(&AppSettings::default()).unwrap();

        assert!(matches!(
            cmd.build_config(&target, &resolved),
            Err(CliError::Scan(ScanError::InvalidConcurrency))
        ));
    }

    #[test]
    fn test_sinks_follow_flags() {
        let cmd = scan_args(&["127.0.0.1", "--progress", "--csv", "x.csv"]);
        let target = ScanTarget::parse(&cmd.target).unwrap();
        let resolved = cmd.resolve(&AppSettings::default()).unwrap();
        let config = cmd.build_config(&target, &resolved).unwrap();
        assert_eq!(
            config.sinks(),
            &[SinkSpec::Progress, SinkSpec::Csv(PathBuf::from("x.csv"))]
        );

        let cmd = scan_args(&["127.0.0.1", "-o", "json", "--no-csv"]);
        let resolved = cmd.resolve(&AppSettings::default()).unwrap();
        assert!(cmd.build_config(&target, &resolved).unwrap().sinks().is_empty());
    }
}
