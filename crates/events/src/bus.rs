//! Change-notification publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes [`RecordChange`](crate::RecordChange) notifications from
//! the document store to listeners. It is deliberately lightweight:
//!
//! - **Transport-agnostic**: in-memory channels in dev/tests, a changefeed or
//!   trigger runtime in production
//! - **At-least-once delivery**: a notification may arrive more than once;
//!   listeners must be idempotent
//! - **No persistence**: the document store is the source of truth
//!
//! Per-publisher order is preserved, which keeps writes to one document in
//! the order the store applied them.

use std::sync::Arc;

use tokio::sync::mpsc::{UnboundedReceiver, error::TryRecvError};

/// A subscription to a notification stream.
///
/// Each subscription receives a copy of every message published after it was
/// created (broadcast semantics). Meant to be drained by a single task.
///
/// ```ignore
/// let mut subscription = bus.subscribe();
/// while let Some(change) = subscription.recv().await {
///     listener.on_record_written(change.before(), change.after(), &change.uid()?).await?;
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: UnboundedReceiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: UnboundedReceiver<M>) -> Self {
        Self { receiver }
    }

    /// Wait for the next message. `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<M> {
        self.receiver.recv().await
    }

    /// Take a message if one is ready, without waiting.
    pub fn try_recv(&mut self) -> Result<M, TryRecvError> {
        self.receiver.try_recv()
    }
}

/// Domain-agnostic notification bus (pub/sub).
///
/// `publish()` is synchronous so stores can call it right after applying a
/// write, while still holding the ordering they applied writes in. Failures
/// are surfaced to the caller.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
