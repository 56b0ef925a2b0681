//! Batch-accumulating worker loop.
//!
//! Each worker owns a private buffer and a flush timer and competes with its
//! siblings for items on the shared queue. A worker is `Running` until the
//! queue reports closure, flushes whatever it still holds (`Draining`) and
//! then exits for good (`Stopped`).

use super::payload::BatchHandler;
use super::wait_group::WaitGroup;
use crate::logging::{log_event, SharedLogger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Receiving half of the bounded queue, shared by all workers.
pub(crate) type SharedReceiver<T> = Arc<Mutex<mpsc::Receiver<T>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Running,
    Draining,
    Stopped,
}

pub(crate) struct Worker<T, H> {
    pub(crate) id: usize,
    pub(crate) rx: SharedReceiver<T>,
    pub(crate) handler: Arc<H>,
    pub(crate) cancel: CancellationToken,
    pub(crate) in_flight: Arc<WaitGroup>,
    pub(crate) logger: SharedLogger,
    pub(crate) batch_size: usize,
    pub(crate) batch_timeout: Duration,
}

impl<T, H> Worker<T, H>
where
    T: Send + 'static,
    H: BatchHandler<T>,
{
    /// Runs until the queue is closed and drained. Returns the terminal state.
    pub(crate) async fn run(self) -> WorkerState {
        let mut ticker = flush_ticker(self.batch_timeout);
        let mut batch: Vec<T> = Vec::with_capacity(self.batch_size);
        let mut state = WorkerState::Running;

        while state == WorkerState::Running {
            tokio::select! {
                next = recv_shared(&self.rx) => match next {
                    Some(item) => {
                        log_event!(self.logger, "worker {}: putting a new batch item", self.id);
                        batch.push(item);
                        self.in_flight.done();
                        if batch.len() >= self.batch_size {
                            log_event!(
                                self.logger,
                                "worker {}: the batch is full, processing {} items",
                                self.id,
                                batch.len()
                            );
                            self.flush(&mut batch).await;
                            ticker.reset();
                        }
                    }
                    None => state = WorkerState::Draining,
                },
                _ = ticker.tick() => {
                    if !batch.is_empty() {
                        log_event!(
                            self.logger,
                            "worker {}: the batch timed out, processing {} items",
                            self.id,
                            batch.len()
                        );
                        self.flush(&mut batch).await;
                        ticker.reset();
                    }
                }
            }
        }

        log_event!(
            self.logger,
            "worker {}: the channel is closed, processing {} remaining items",
            self.id,
            batch.len()
        );
        if !batch.is_empty() {
            self.flush(&mut batch).await;
        }
        WorkerState::Stopped
    }

    async fn flush(&self, batch: &mut Vec<T>) {
        let items = std::mem::replace(batch, Vec::with_capacity(self.batch_size));
        self.handler.handle(self.cancel.clone(), items).await;
    }
}

/// Periodic timer whose first tick lands one full period from now.
fn flush_ticker(period: Duration) -> Interval {
    let mut ticker = time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Cancel-safe: dropping the future releases the lock without losing an item.
async fn recv_shared<T>(rx: &Mutex<mpsc::Receiver<T>>) -> Option<T> {
    rx.lock().await.recv().await
}

/// Marks a worker as exited when dropped.
pub(crate) struct LiveGuard(pub(crate) Arc<WaitGroup>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// Waits for a spawned worker and reports how it ended. The live-worker count
/// drops once the worker task has finished, whether it returned or panicked.
pub(crate) async fn supervise(
    id: usize,
    task: JoinHandle<WorkerState>,
    guard: LiveGuard,
    logger: SharedLogger,
) {
    let _guard = guard;
    match task.await {
        Ok(_) => log_event!(logger, "worker {}: stopped", id),
        Err(e) if e.is_panic() => {
            log_event!(logger, "worker {}: handler panicked, worker stopped", id)
        }
        Err(_) => log_event!(logger, "worker {}: cancelled by runtime shutdown", id),
    }
}
