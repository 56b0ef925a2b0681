//! Async countdown latch.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts outstanding units of work; `wait` resolves once the count is zero.
#[derive(Debug, Default)]
pub(crate) struct WaitGroup {
    count: AtomicUsize,
    zero: Notify,
}

impl WaitGroup {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&self, n: usize) {
        self.count.fetch_add(n, Ordering::AcqRel);
    }

    pub(crate) fn done(&self) {
        let prev = self.count.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(prev > 0, "WaitGroup::done called more times than add");
        if prev == 1 {
            self.zero.notify_waiters();
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    pub(crate) async fn wait(&self) {
        loop {
            // Register before checking so a concurrent `done` cannot slip between.
            let notified = self.zero.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.count() == 0 {
                return;
            }
            notified.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_on_empty_group_returns() {
        let wg = WaitGroup::new();
        wg.wait().await;
        assert_eq!(wg.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_blocks_until_zero() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(3);

        let waiter = {
            let wg = Arc::clone(&wg);
            tokio::spawn(async move { wg.wait().await })
        };

        wg.done();
        wg.done();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());
        assert_eq!(wg.count(), 1);

        wg.done();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should finish")
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_waiters_many_releasers() {
        let wg = Arc::new(WaitGroup::new());
        wg.add(100);

        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let wg = Arc::clone(&wg);
                tokio::spawn(async move { wg.wait().await })
            })
            .collect();
        for _ in 0..100 {
            let wg = Arc::clone(&wg);
            tokio::spawn(async move { wg.done() });
        }
        for w in waiters {
            tokio::time::timeout(Duration::from_secs(2), w)
                .await
                .expect("waiter should finish")
                .unwrap();
        }
    }
}
