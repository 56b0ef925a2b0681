//! Item validation and the batch handler seam.

use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// An item that can be submitted to a [`crate::Batcher`].
///
/// `add` rejects items that report themselves empty with
/// [`crate::Error::InputInvalid`]. Most domain types have no notion of
/// "empty" and can rely on the default:
///
/// ```rust
/// struct Event { id: u64 }
/// impl batcher::Payload for Event {}
/// ```
pub trait Payload {
    fn is_empty_payload(&self) -> bool {
        false
    }
}

impl Payload for String {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for &'static str {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl Payload for Bytes {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<U> Payload for Vec<U> {
    fn is_empty_payload(&self) -> bool {
        self.is_empty()
    }
}

impl<U> Payload for Option<U> {
    fn is_empty_payload(&self) -> bool {
        self.is_none()
    }
}

impl<U: Payload + ?Sized> Payload for Box<U> {
    fn is_empty_payload(&self) -> bool {
        (**self).is_empty_payload()
    }
}

impl<U: Payload + ?Sized> Payload for Arc<U> {
    fn is_empty_payload(&self) -> bool {
        (**self).is_empty_payload()
    }
}

impl Payload for serde_json::Value {
    fn is_empty_payload(&self) -> bool {
        self.is_null()
    }
}

macro_rules! never_empty {
    ($($t:ty),* $(,)?) => {
        $(impl Payload for $t {})*
    };
}

never_empty!(bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

/// Receives every flushed batch.
///
/// With more than one worker the handler is invoked concurrently from several
/// tasks. The token is the one passed to [`crate::Batcher::start`]; the engine
/// never cancels an in-progress call itself.
#[async_trait]
pub trait BatchHandler<T>: Send + Sync + 'static {
    async fn handle(&self, cancel: CancellationToken, batch: Vec<T>);
}

#[async_trait]
impl<T, F, Fut> BatchHandler<T> for F
where
    T: Send + 'static,
    F: Fn(CancellationToken, Vec<T>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send,
{
    async fn handle(&self, cancel: CancellationToken, batch: Vec<T>) {
        self(cancel, batch).await
    }
}
