//! Result aggregation and sink dispatch.

use crate::scanner::traits::ProbeResult;
use crate::scanner::worker::panic_message;
use crate::sink::Sink;
use crate::types::Port;
use futures::future::join_all;
use futures::FutureExt;
use std::collections::BTreeSet;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, warn};

/// Collects results from all workers and fans them out to the sinks.
///
/// Shared with every worker through an `Arc`. The open-port set has its own
/// lock, taken for a single insert; sinks serialize themselves.
pub struct Aggregator {
    sinks: Vec<Arc<dyn Sink>>,
    open_ports: Mutex<BTreeSet<Port>>,
    received: AtomicUsize,
    sink_failures: AtomicUsize,
}

impl Aggregator {
    pub fn new(sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self {
            sinks,
            open_ports: Mutex::new(BTreeSet::new()),
            received: AtomicUsize::new(0),
            sink_failures: AtomicUsize::new(0),
        }
    }

    /// Dispatch one result to every sink and record it if open.
    ///
    /// A failing or panicking sink is logged and counted; the other sinks
    /// still receive the result.
    pub async fn on_result(&self, result: ProbeResult) {
        let outcomes = join_all(
            self.sinks
                .iter()
                .map(|sink| AssertUnwindSafe(sink.consume(&result)).catch_unwind()),
        )
        .await;

        for (sink, outcome) in self.sinks.iter().zip(outcomes) {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(error)) => {
                    self.sink_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(sink = sink.name(), port = %result.port, %error, "sink write failed");
                }
                Err(payload) => {
                    self.sink_failures.fetch_add(1, Ordering::Relaxed);
                    error!(
                        sink = sink.name(),
                        port = %result.port,
                        panic = %panic_message(payload.as_ref()),
                        "sink panicked"
                    );
                }
            }
        }

        if result.is_open {
            self.open_ports
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(result.port);
        }
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Open ports seen so far, ascending. Complete only after drain.
    pub fn snapshot_open_ports(&self) -> Vec<Port> {
        self.open_ports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect()
    }

    /// Number of results handed to `on_result`.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }

    /// Number of failed sink writes across all sinks.
    pub fn sink_failures(&self) -> usize {
        self.sink_failures.load(Ordering::Relaxed)
    }

    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.sinks
    }
}
