//! 批处理引擎：有界队列、工作池以及按大小或超时刷新批次。
//!
//! # Batching Engine
//!
//! Items submitted by any number of producers land in a bounded queue. A pool
//! of workers pulls from that queue, each building its own batch, and hands a
//! batch to the handler as soon as it reaches `batch_size` or `batch_timeout`
//! has passed since that worker's last flush.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Batcher`] | Coordinator: `start`, `add`, `close` |
//! | [`BatcherOptions`] | Caller-facing options, zero means default |
//! | [`BatcherConfig`] | Resolved, immutable configuration |
//! | [`BatchHandler`] | Receives flushed batches; closures qualify |
//! | [`Payload`] | Decides which items are rejected as empty |
//!
//! ## Guarantees
//!
//! - Every item accepted by `add` is delivered exactly once before `close` returns.
//! - No batch is larger than `batch_size`.
//! - With a single worker, batches preserve submission order. With several
//!   workers there is no ordering across batches and the handler runs concurrently.
//! - Handler panics are not caught or retried; the panicking worker stops and
//!   the items it held count as delivered.

mod batcher;
mod config;
mod payload;
mod wait_group;
mod worker;

pub use batcher::{Batcher, Lifecycle};
pub use config::{
    BatcherConfig, BatcherOptions, DEFAULT_BATCH_SIZE, DEFAULT_BATCH_TIMEOUT, DEFAULT_WORKERS,
};
pub use payload::{BatchHandler, Payload};
