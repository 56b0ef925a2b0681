//! Shared helpers for the integration tests.

#![allow(dead_code)]

use batcher::{BatchHandler, BatcherOptions, NoopLogger};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Options with a silent logger so test output stays readable.
pub fn quiet() -> BatcherOptions {
    BatcherOptions::new().with_logger(NoopLogger)
}

/// Records every batch handed to the handler, in invocation order.
#[derive(Clone, Default)]
pub struct Recorder<T> {
    batches: Arc<Mutex<Vec<Vec<T>>>>,
}

impl<T: Clone + Send + 'static> Recorder<T> {
    pub fn new() -> Self {
        Self {
            batches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn handler(&self) -> impl BatchHandler<T> {
        let batches = Arc::clone(&self.batches);
        move |_cancel: CancellationToken, batch: Vec<T>| {
            let batches = Arc::clone(&batches);
            async move {
                batches.lock().unwrap().push(batch);
            }
        }
    }

    pub fn batches(&self) -> Vec<Vec<T>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.batches().iter().map(Vec::len).collect()
    }

    pub fn items(&self) -> Vec<T> {
        self.batches().into_iter().flatten().collect()
    }

    pub fn invocations(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}
