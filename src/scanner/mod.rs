//! Scan engine.
//!
//! A [`ScanCoordinator`] fills a [`WorkQueue`] with ports, a [`WorkerPool`]
//! drains it through a [`Probe`], and an [`Aggregator`] fans each result out
//! to the configured sinks while tracking open ports.

pub mod aggregator;
pub mod coordinator;
pub mod queue;
pub mod tcp;
pub mod traits;
pub mod worker;

pub use aggregator::Aggregator;
pub use coordinator::{ScanCoordinator, ScanState};
pub use queue::{WorkItem, WorkQueue};
pub use tcp::TcpConnectProbe;
pub use traits::{PortStatus, Probe, ProbeResult};
pub use worker::{WorkerContext, WorkerPool};

use crate::error::{ScanError, ScanResult};
use crate::sink::SinkSpec;
use crate::types::{Port, ScanTarget};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Default number of concurrent workers.
pub const DEFAULT_CONCURRENCY: usize = 50;

/// Default per-probe connect timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// Validated, immutable configuration for one scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    target: ScanTarget,
    ports: Vec<Port>,
    concurrency: usize,
    timeout: Duration,
    sinks: Vec<SinkSpec>,
}

impl ScanConfig {
    /// Validate inputs; nothing is scanned if this fails.
    pub fn new(
        host: &str,
        ports: Vec<Port>,
        concurrency: usize,
        timeout: Duration,
    ) -> ScanResult<Self> {
        let target = ScanTarget::parse(host)?;
        if ports.is_empty() {
            return Err(ScanError::EmptyPortList);
        }
        if concurrency == 0 {
            return Err(ScanError::InvalidConcurrency);
        }
        if timeout.is_zero() {
            return Err(ScanError::InvalidTimeout);
        }

        Ok(Self {
            target,
            ports,
            concurrency,
            timeout,
            sinks: Vec::new(),
        })
    }

    /// Add an output sink.
    pub fn with_sink(mut self, sink: SinkSpec) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn target(&self) -> &ScanTarget {
        &self.target
    }

    /// Ports in enqueue order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn sinks(&self) -> &[SinkSpec] {
        &self.sinks
    }
}

/// Final report of a completed scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Target host as given.
    pub host: String,
    /// Number of results produced.
    pub ports_scanned: usize,
    /// Open ports, ascending and without duplicates.
    pub open_ports: Vec<Port>,
    /// Sink writes that failed during the scan.
    pub sink_failures: usize,
    /// When the scan started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Execute a complete scan with real TCP connect probes.
pub async fn run_scan(config: ScanConfig) -> ScanResult<ScanSummary> {
    ScanCoordinator::new(config).run().await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ports() -> Vec<Port> {
        vec![Port::new(80).unwrap()]
    }

    #[test]
    fn test_config_validation() {
        assert!(ScanConfig::new("127.0.0.1", ports(), 1, DEFAULT_TIMEOUT).is_ok());

        assert!(matches!(
            ScanConfig::new("", ports(), 1, DEFAULT_TIMEOUT),
            Err(ScanError::InvalidTarget(_))
        ));
        assert!(matches!(
            ScanConfig::new("127.0.0.1", ports(), 0, DEFAULT_TIMEOUT),
            Err(ScanError::InvalidConcurrency)
        ));
        assert!(matches!(
            ScanConfig::new("127.0.0.1", ports(), 1, Duration::ZERO),
            Err(ScanError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_config_keeps_order_and_duplicates() {
        let ports: Vec<Port> = [443, 22, 443]
            .iter()
            .map(|&n| Port::new(n).unwrap())
            .collect();
        let config = ScanConfig::new("localhost", ports.clone(), 2, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(config.ports(), ports.as_slice());
    }

    #[test]
    fn test_summary_serializes_ports_as_numbers() {
        let summary = ScanSummary {
            host: "127.0.0.1".to_string(),
            ports_scanned: 2,
            open_ports: vec![Port::new(22).unwrap()],
            sink_failures: 0,
            started_at: Utc::now(),
            duration_ms: 12,
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["open_ports"], serde_json::json!([22]));
        assert_eq!(json["ports_scanned"], 2);
    }
}
