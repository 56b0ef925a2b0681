//! Coordinator: owns the bounded queue and the worker pool.

use super::config::{BatcherConfig, BatcherOptions};
use super::payload::{BatchHandler, Payload};
use super::wait_group::WaitGroup;
use super::worker::{supervise, LiveGuard, SharedReceiver, Worker};
use crate::logging::log_event;
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio_util::sync::CancellationToken;

/// Shutdown progress. Moves forward only: `Open -> Closing -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Accepting items.
    Open,
    /// Queue closed; waiting for accepted items to be delivered.
    Closing,
    /// Every accepted item delivered and every worker exited.
    Closed,
}

struct Shared<T> {
    config: BatcherConfig,
    /// Sending half of the queue; `None` once closing has begun. Held by `add`
    /// for its whole enqueue so closing can never race a send.
    sender: Mutex<Option<mpsc::Sender<T>>>,
    receiver: SharedReceiver<T>,
    lifecycle: watch::Sender<Lifecycle>,
    in_flight: Arc<WaitGroup>,
    live_workers: Arc<WaitGroup>,
}

/// Groups items into batches and hands them to a handler from a pool of
/// workers, flushing on size or after a timeout, whichever comes first.
///
/// `Batcher` is a cheap handle; clones share the same queue and workers.
///
/// ```rust,no_run
/// use batcher::{Batcher, BatcherOptions};
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn run() -> batcher::Result<()> {
/// let batcher = Batcher::new(
///     BatcherOptions::new()
///         .with_workers(2)
///         .with_batch_size(100)
///         .with_batch_timeout(Duration::from_millis(250)),
/// );
/// batcher.start(CancellationToken::new(), |_cancel: CancellationToken, batch: Vec<String>| async move {
///     println!("flushing {} rows", batch.len());
/// });
///
/// batcher.add("row-1".to_string()).await?;
/// batcher.close().await;
/// # Ok(())
/// # }
/// ```
pub struct Batcher<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for Batcher<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> Default for Batcher<T>
where
    T: Payload + Send + 'static,
{
    fn default() -> Self {
        Self::new(BatcherOptions::default())
    }
}

impl<T> Batcher<T>
where
    T: Payload + Send + 'static,
{
    /// Defaults: workers = 1, batch size = 10, batch timeout = 1s, stdout logger.
    pub fn new(options: BatcherOptions) -> Self {
        let config = options.resolve();
        let (tx, rx) = mpsc::channel(config.batch_size);
        let (lifecycle, _) = watch::channel(Lifecycle::Open);
        Self {
            shared: Arc::new(Shared {
                config,
                sender: Mutex::new(Some(tx)),
                receiver: Arc::new(Mutex::new(rx)),
                lifecycle,
                in_flight: Arc::new(WaitGroup::new()),
                live_workers: Arc::new(WaitGroup::new()),
            }),
        }
    }

    /// Spawns the worker pool on the current tokio runtime.
    ///
    /// Call once per batcher; every call spawns another full pool. Items added
    /// before `start` wait in the queue.
    pub fn start<H>(&self, cancel: CancellationToken, handler: H)
    where
        H: BatchHandler<T>,
    {
        let shared = &self.shared;
        let workers = shared.config.workers;
        log_event!(
            shared.config.logger,
            "starting batch workers with {} workers",
            workers
        );

        let handler = Arc::new(handler);
        shared.live_workers.add(workers);
        for id in 0..workers {
            let worker = Worker {
                id,
                rx: Arc::clone(&shared.receiver),
                handler: Arc::clone(&handler),
                cancel: cancel.clone(),
                in_flight: Arc::clone(&shared.in_flight),
                logger: Arc::clone(&shared.config.logger),
                batch_size: shared.config.batch_size,
                batch_timeout: shared.config.batch_timeout,
            };
            let task = tokio::spawn(worker.run());
            tokio::spawn(supervise(
                id,
                task,
                LiveGuard(Arc::clone(&shared.live_workers)),
                Arc::clone(&shared.config.logger),
            ));
        }
    }

    /// Enqueues one item, waiting while the queue is full.
    ///
    /// Fails with [`Error::InputInvalid`] for an empty item and with
    /// [`Error::Closed`] once [`close`](Self::close) has begun. Neither failure
    /// changes any state.
    pub async fn add(&self, item: T) -> Result<()> {
        if item.is_empty_payload() {
            return Err(Error::InputInvalid);
        }

        let shared = &self.shared;
        let sender = shared.sender.lock().await;
        let tx = match sender.as_ref() {
            Some(tx) if *shared.lifecycle.borrow() == Lifecycle::Open => tx,
            _ => return Err(Error::Closed),
        };

        // Only the wait for a slot may be cancelled; counting and sending happen
        // together once the slot is held.
        let permit = tx.reserve().await.map_err(|_| Error::Closed)?;
        log_event!(shared.config.logger, "putting item on the batch queue");
        shared.in_flight.add(1);
        permit.send(item);
        Ok(())
    }

    /// Stops accepting items, then waits until every accepted item has been
    /// handed to the handler and every worker has exited.
    ///
    /// Idempotent: only the first call closes the queue. Every caller that
    /// finds the batcher not yet `Closed` waits for the same drain, so a
    /// cancelled first call never strands later ones. Nothing is flushed twice.
    pub async fn close(&self) {
        let shared = &self.shared;
        let first = {
            let mut sender = shared.sender.lock().await;
            let first = shared.lifecycle.send_if_modified(|state| {
                if *state == Lifecycle::Open {
                    *state = Lifecycle::Closing;
                    true
                } else {
                    false
                }
            });
            if first {
                // Dropping the only sender closes the queue for the workers.
                sender.take();
            }
            first
        };

        if first {
            log_event!(shared.config.logger, "closing batch");
        } else if self.lifecycle() == Lifecycle::Closed {
            return;
        }

        shared.in_flight.wait().await;
        shared.live_workers.wait().await;
        let finished = shared.lifecycle.send_if_modified(|state| {
            if *state == Lifecycle::Closed {
                false
            } else {
                *state = Lifecycle::Closed;
                true
            }
        });
        if finished {
            log_event!(shared.config.logger, "batch closed");
        }
    }

    /// Resolved configuration.
    pub fn config(&self) -> &BatcherConfig {
        &self.shared.config
    }

    /// Current shutdown progress.
    pub fn lifecycle(&self) -> Lifecycle {
        *self.shared.lifecycle.borrow()
    }

    /// `true` once [`close`](Self::close) has begun.
    pub fn is_closed(&self) -> bool {
        self.lifecycle() != Lifecycle::Open
    }

    /// Items accepted but not yet taken off the queue by a worker.
    pub fn pending(&self) -> usize {
        self.shared.in_flight.count()
    }

    /// Worker tasks spawned by `start` that have not exited yet.
    pub fn live_workers(&self) -> usize {
        self.shared.live_workers.count()
    }
}

impl<T> fmt::Debug for Batcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Batcher")
            .field("config", &self.shared.config)
            .field("lifecycle", &*self.shared.lifecycle.borrow())
            .field("pending", &self.shared.in_flight.count())
            .field("live_workers", &self.shared.live_workers.count())
            .finish()
    }
}
