//! Fixed-size pool of probe workers.

use crate::error::{ScanError, ScanResult};
use crate::scanner::aggregator::Aggregator;
use crate::scanner::queue::{WorkItem, WorkQueue};
use crate::scanner::traits::{Probe, ProbeResult};
use crate::types::{Port, ScanTarget};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

/// Everything a worker needs, shared by all of them.
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: Arc<WorkQueue>,
    pub probe: Arc<dyn Probe>,
    pub aggregator: Arc<Aggregator>,
    pub target: Arc<ScanTarget>,
    pub timeout: Duration,
}

/// Handles to the running worker tasks.
pub struct WorkerPool {
    handles: Vec<JoinHandle<usize>>,
}

impl WorkerPool {
    /// Spawn exactly `size` workers on the current runtime.
    pub fn spawn(size: usize, ctx: WorkerContext) -> Self {
        let handles = (0..size)
            .map(|id| tokio::spawn(run_worker(id, ctx.clone())))
            .collect();
        debug!(workers = size, "worker pool started");
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Wait for every worker to exit.
    ///
    /// Workers only exit after popping a poison item, so call this once one
    /// poison per worker has been pushed. A worker that panicked while
    /// handling a port fails the join even though it kept running.
    pub async fn join(self) -> ScanResult<()> {
        let mut failure = None;
        for (id, handle) in self.handles.into_iter().enumerate() {
            let reason = match handle.await {
                Ok(0) => continue,
                Ok(panics) => format!("worker {id} panicked on {panics} port(s)"),
                Err(e) => e.to_string(),
            };
            failure.get_or_insert(ScanError::WorkerFailed(reason));
        }
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// One worker: probe, dispatch, acknowledge, repeat until poisoned.
///
/// Every popped item is acknowledged, including one whose handling panicked,
/// so the queue always drains. Returns the number of panics caught.
async fn run_worker(id: usize, ctx: WorkerContext) -> usize {
    let mut panics = 0;
    loop {
        match ctx.queue.pop().await {
            WorkItem::Poison => {
                ctx.queue.mark_done();
                trace!(worker = id, "worker stopping");
                break;
            }
            WorkItem::Port(port) => {
                let handled = AssertUnwindSafe(handle_port(&ctx, port))
                    .catch_unwind()
                    .await;
                if let Err(payload) = handled {
                    panics += 1;
                    error!(
                        worker = id,
                        %port,
                        panic = %panic_message(payload.as_ref()),
                        "worker panicked while handling port"
                    );
                }
                ctx.queue.mark_done();
            }
        }
    }
    panics
}

async fn handle_port(ctx: &WorkerContext, port: Port) {
    let is_open = ctx.probe.probe(ctx.target.host(), port, ctx.timeout).await;
    ctx.aggregator.on_result(ProbeResult::new(port, is_open)).await;
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Reports even ports open and tracks peak concurrency.
    #[derive(Default)]
    struct EvenProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Probe for EvenProbe {
        async fn probe(&self, _host: &str, port: Port, _timeout: Duration) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            port.as_u16() % 2 == 0
        }
    }

    fn context(probe: Arc<dyn Probe>) -> WorkerContext {
        WorkerContext {
            queue: Arc::new(WorkQueue::new()),
            probe,
            aggregator: Arc::new(Aggregator::new(Vec::new())),
            target: Arc::new(ScanTarget::parse("127.0.0.1").unwrap()),
            timeout: Duration::from_millis(100),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_pool_processes_all_and_stops() {
        let probe = Arc::new(EvenProbe::default());
        let ctx = context(probe.clone());
        let pool = WorkerPool::spawn(4, ctx.clone());
        assert_eq!(pool.len(), 4);

        for n in 1..=40 {
            ctx.queue.push(WorkItem::Port(Port::new(n).unwrap()));
        }
        ctx.queue.wait_until_drained().await;
        assert_eq!(ctx.aggregator.received(), 40);

        for _ in 0..pool.len() {
            ctx.queue.push(WorkItem::Poison);
        }
        ctx.queue.wait_until_drained().await;
        pool.join().await.unwrap();

        assert_eq!(ctx.aggregator.snapshot_open_ports().len(), 20);
        assert!(probe.peak.load(Ordering::SeqCst) > 1);
        assert!(probe.peak.load(Ordering::SeqCst) <= 4);
    }

    #[tokio::test]
    async fn test_worker_exits_on_poison_only() {
        let ctx = context(Arc::new(EvenProbe::default()));
        let pool = WorkerPool::spawn(1, ctx.clone());

        ctx.queue.push(WorkItem::Poison);
        pool.join().await.unwrap();

        assert_eq!(ctx.queue.pending(), 0);
        assert_eq!(ctx.aggregator.received(), 0);
    }

    /// Panics on one port, reports everything else closed.
    struct PanicOn(u16);

    #[async_trait]
    impl Probe for PanicOn {
        async fn probe(&self, _host: &str, port: Port, _timeout: Duration) -> bool {
            if port.as_u16() == self.0 {
                panic!("probe exploded on port {}", port);
            }
            false
        }
    }

    #[tokio::test]
    async fn test_panic_is_acknowledged_and_reported_at_join() {
        let ctx = context(Arc::new(PanicOn(2)));
        let pool = WorkerPool::spawn(2, ctx.clone());

        for n in 1..=4 {
            ctx.queue.push(WorkItem::Port(Port::new(n).unwrap()));
        }
        tokio::time::timeout(Duration::from_secs(5), ctx.queue.wait_until_drained())
            .await
            .expect("queue must drain after a panic");
        assert_eq!(ctx.aggregator.received(), 3);

        for _ in 0..pool.len() {
            ctx.queue.push(WorkItem::Poison);
        }
        ctx.queue.wait_until_drained().await;

        let err = pool.join().await.unwrap_err();
        assert!(matches!(err, ScanError::WorkerFailed(ref reason) if reason.contains("panicked")));
    }

    #[test]
    fn test_panic_message_text() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
