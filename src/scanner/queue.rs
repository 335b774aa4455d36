//! Work queue with completion tracking.
//!
//! Items are handed out in push order. An item counts as outstanding from
//! `push` until the consumer calls [`WorkQueue::mark_done`], so
//! [`WorkQueue::wait_until_drained`] only returns once every popped item has
//! been fully processed, not merely taken.

use crate::types::Port;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{watch, Semaphore};
use tracing::warn;

/// An entry in the work queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkItem {
    /// A port to probe.
    Port(Port),
    /// Tells the worker that pops it to exit.
    Poison,
}

/// FIFO of pending work shared between the coordinator and workers.
#[derive(Debug)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    /// One permit per queued item.
    available: Semaphore,
    /// Pushed but not yet marked done.
    pending: watch::Sender<usize>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (pending, _) = watch::channel(0);
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Semaphore::new(0),
            pending,
        }
    }

    /// Append an item and wake one waiting consumer.
    pub fn push(&self, item: WorkItem) {
        self.pending.send_modify(|n| *n += 1);
        self.lock_items().push_back(item);
        self.available.add_permits(1);
    }

    /// Take the next item, waiting while the queue is empty.
    pub async fn pop(&self) -> WorkItem {
        loop {
            match self.available.acquire().await {
                Ok(permit) => permit.forget(),
                // The semaphore is never closed while the queue is alive.
                Err(_) => return WorkItem::Poison,
            }
            let next = self.lock_items().pop_front();
            if let Some(item) = next {
                return item;
            }
        }
    }

    /// Acknowledge that a popped item has been fully processed.
    pub fn mark_done(&self) {
        let decremented = self.pending.send_if_modified(|n| match *n {
            0 => false,
            _ => {
                *n -= 1;
                true
            }
        });
        if !decremented {
            warn!("mark_done called with no outstanding work items");
        }
    }

    /// Wait until every pushed item has been marked done.
    pub async fn wait_until_drained(&self) {
        let mut rx = self.pending.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Items pushed and not yet marked done.
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Items waiting to be popped.
    pub fn queued(&self) -> usize {
        self.lock_items().len()
    }

    fn lock_items(&self) -> MutexGuard<'_, VecDeque<WorkItem>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_pending, assert_ready, task};

    fn port(n: u16) -> WorkItem {
        WorkItem::Port(Port::new(n).unwrap())
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = WorkQueue::new();
        queue.push(port(20));
        queue.push(port(21));
        queue.push(WorkItem::Poison);

        assert_eq!(queue.pop().await, port(20));
        assert_eq!(queue.pop().await, port(21));
        assert_eq!(queue.pop().await, WorkItem::Poison);
        assert_eq!(queue.queued(), 0);
    }

    #[test]
    fn test_drain_waits_for_mark_done_not_pop() {
        let queue = WorkQueue::new();
        queue.push(port(80));
        queue.push(port(81));

        let mut drained = task::spawn(queue.wait_until_drained());
        assert_pending!(drained.poll());

        // Popping alone must not count as completion.
        let mut first = task::spawn(queue.pop());
        assert_eq!(assert_ready!(first.poll()), port(80));
        let mut second = task::spawn(queue.pop());
        assert_eq!(assert_ready!(second.poll()), port(81));
        assert_pending!(drained.poll());
        assert_eq!(queue.pending(), 2);

        queue.mark_done();
        assert!(drained.is_woken());
        assert_pending!(drained.poll());

        queue.mark_done();
        assert!(drained.is_woken());
        assert_ready!(drained.poll());
    }

    #[test]
    fn test_poison_counts_toward_drain() {
        let queue = WorkQueue::new();
        queue.push(WorkItem::Poison);

        let mut drained = task::spawn(queue.wait_until_drained());
        assert_pending!(drained.poll());

        let mut popped = task::spawn(queue.pop());
        assert_eq!(assert_ready!(popped.poll()), WorkItem::Poison);
        assert_pending!(drained.poll());

        queue.mark_done();
        assert_ready!(drained.poll());
    }

    #[test]
    fn test_empty_queue_is_drained() {
        let queue = WorkQueue::new();
        let mut drained = task::spawn(queue.wait_until_drained());
        assert_ready!(drained.poll());
    }

    #[test]
    fn test_pop_waits_for_push() {
        let queue = WorkQueue::new();
        let mut popped = task::spawn(queue.pop());
        assert_pending!(popped.poll());

        queue.push(port(443));
        assert!(popped.is_woken());
        assert_eq!(assert_ready!(popped.poll()), port(443));
    }

    #[test]
    fn test_extra_mark_done_does_not_underflow() {
        let queue = WorkQueue::new();
        queue.mark_done();
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_consumers_take_each_item_once() {
        let queue = Arc::new(WorkQueue::new());
        for n in 1..=200 {
            queue.push(port(n));
        }
        for _ in 0..8 {
            queue.push(WorkItem::Poison);
        }

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = Arc::clone(&queue);
            handles.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                loop {
                    let item = queue.pop().await;
                    queue.mark_done();
                    match item {
                        WorkItem::Port(p) => seen.push(p.as_u16()),
                        WorkItem::Poison => break,
                    }
                    tokio::time::sleep(Duration::from_micros(50)).await;
                }
                seen
            }));
        }

        let mut all = Vec::new();
        for handle in handles {
            all.extend(handle.await.unwrap());
        }
        queue.wait_until_drained().await;

        all.sort_unstable();
        assert_eq!(all, (1..=200).collect::<Vec<u16>>());
        assert_eq!(queue.pending(), 0);
    }
}
