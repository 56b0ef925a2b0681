//! # batcher
//!
//! 通用批处理引擎：将任意调用方提交的条目按批次交给用户处理函数。
//!
//! Generic batching engine for tokio. Producers [`add`](Batcher::add) items;
//! a pool of workers groups them and calls a handler once per batch, flushing
//! when a batch is full or when the flush timeout elapses, whichever comes
//! first. [`close`](Batcher::close) stops intake and returns only after every
//! accepted item has been delivered.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use batcher::{Batcher, BatcherOptions, TracingLogger};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> batcher::Result<()> {
//!     let batcher = Batcher::new(
//!         BatcherOptions::new()
//!             .with_batch_size(4)
//!             .with_logger(TracingLogger::default()),
//!     );
//!
//!     batcher.start(CancellationToken::new(), |_cancel: CancellationToken, batch: Vec<u64>| async move {
//!         println!("got {:?}", batch);
//!     });
//!
//!     for i in 0..10 {
//!         batcher.add(i).await?;
//!     }
//!     batcher.close().await; // [0, 1, 2, 3] [4, 5, 6, 7] [8, 9]
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`batch`] | Coordinator, workers, options |
//! | [`logging`] | Pluggable diagnostic sinks |
//! | [`error`] | Error type |

pub mod batch;
pub mod logging;

pub use batch::{BatchHandler, Batcher, BatcherConfig, BatcherOptions, Lifecycle, Payload};
pub use logging::{LineLogger, Logger, NoopLogger, StdoutLogger, TracingLogger};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::Error;
