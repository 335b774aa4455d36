//! Scan orchestration.
//!
//! A scan moves through `Idle -> Enqueuing -> Draining -> Stopping ->
//! Complete`. Workers are stopped with one poison item each, pushed only
//! after every real item has been acknowledged, and the coordinator waits for
//! the poison items to be acknowledged too. Nothing is left running when
//! [`ScanCoordinator::run`] returns.

use crate::error::{ScanError, ScanResult};
use crate::scanner::aggregator::Aggregator;
use crate::scanner::queue::{WorkItem, WorkQueue};
use crate::scanner::tcp::TcpConnectProbe;
use crate::scanner::traits::Probe;
use crate::scanner::worker::{WorkerContext, WorkerPool};
use crate::scanner::{ScanConfig, ScanSummary};
use crate::sink::{ConsoleSink, CsvSink, ProgressSink, Sink, SinkSpec};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Lifecycle of a single scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Enqueuing,
    Draining,
    Stopping,
    Complete,
}

impl ScanState {
    /// The only state reachable from this one.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Idle => Some(Self::Enqueuing),
            Self::Enqueuing => Some(Self::Draining),
            Self::Draining => Some(Self::Stopping),
            Self::Stopping => Some(Self::Complete),
            Self::Complete => None,
        }
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Enqueuing => "enqueuing",
            Self::Draining => "draining",
            Self::Stopping => "stopping",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Runs one scan from configuration to summary.
///
/// `run` takes `self`, so an instance scans exactly once.
pub struct ScanCoordinator {
    config: ScanConfig,
    probe: Arc<dyn Probe>,
    extra_sinks: Vec<Arc<dyn Sink>>,
    state: ScanState,
}

impl ScanCoordinator {
    /// Coordinator using real TCP connect probes.
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            probe: Arc::new(TcpConnectProbe),
            extra_sinks: Vec::new(),
            state: ScanState::Idle,
        }
    }

    /// Replace the probe implementation.
    pub fn with_probe(mut self, probe: Arc<dyn Probe>) -> Self {
        self.probe = probe;
        self
    }

    /// Register an already-constructed sink alongside the configured ones.
    pub fn with_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.extra_sinks.push(sink);
        self
    }

    /// Execute the scan.
    ///
    /// Fails before any worker starts if a sink cannot be opened. Once sinks
    /// are open they are closed on every path out of this function.
    pub async fn run(mut self) -> ScanResult<ScanSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();

        let sinks = self.open_sinks()?;
        let aggregator = Arc::new(Aggregator::new(sinks));

        let scanned = self.scan(&aggregator).await;

        for sink in aggregator.sinks() {
            if let Err(error) = sink.close().await {
                warn!(sink = sink.name(), %error, "failed to close sink");
            }
        }
        scanned?;

        let open_ports = aggregator.snapshot_open_ports();
        self.advance(ScanState::Complete);

        Ok(ScanSummary {
            host: self.config.target().host().to_string(),
            ports_scanned: aggregator.received(),
            open_ports,
            sink_failures: aggregator.sink_failures(),
            started_at,
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Build the configured sinks; stateful ones first so a failure leaves
    /// nothing else created.
    fn open_sinks(&self) -> ScanResult<Vec<Arc<dyn Sink>>> {
        let (stateful, stateless): (Vec<&SinkSpec>, Vec<&SinkSpec>) =
            self.config.sinks().iter().partition(|spec| spec.is_stateful());

        let mut sinks: Vec<Arc<dyn Sink>> = Vec::new();
        for spec in stateful.into_iter().chain(stateless) {
            let sink: Arc<dyn Sink> = match spec {
                SinkSpec::Csv(path) => {
                    let csv = CsvSink::create(path, self.config.target()).map_err(|source| {
                        ScanError::SinkSetup {
                            sink: format!("csv ({})", path.display()),
                            source,
                        }
                    })?;
                    Arc::new(csv)
                }
                SinkSpec::Console { show_closed } => Arc::new(ConsoleSink::stdout(*show_closed)),
                SinkSpec::Progress => Arc::new(ProgressSink::new(self.config.ports().len())),
            };
            sinks.push(sink);
        }
        sinks.extend(self.extra_sinks.iter().cloned());

        Ok(sinks)
    }

    /// Enqueue, drain, stop. Everything between opening and closing sinks.
    async fn scan(&mut self, aggregator: &Arc<Aggregator>) -> ScanResult<()> {
        let queue = Arc::new(WorkQueue::new());
        let ctx = WorkerContext {
            queue: Arc::clone(&queue),
            probe: Arc::clone(&self.probe),
            aggregator: Arc::clone(aggregator),
            target: Arc::new(self.config.target().clone()),
            timeout: self.config.timeout(),
        };

        self.advance(ScanState::Enqueuing);
        let pool = WorkerPool::spawn(self.config.concurrency(), ctx);
        for &port in self.config.ports() {
            queue.push(WorkItem::Port(port));
        }

        self.advance(ScanState::Draining);
        queue.wait_until_drained().await;

        self.advance(ScanState::Stopping);
        for _ in 0..pool.len() {
            queue.push(WorkItem::Poison);
        }
        queue.wait_until_drained().await;
        pool.join().await
    }

    fn advance(&mut self, next: ScanState) {
        debug_assert_eq!(self.state.next(), Some(next), "illegal scan state transition");
        debug!(from = %self.state, to = %next, "scan state");
        self.state = next;
    }
}
