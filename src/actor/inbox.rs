//! Per-actor bounded FIFO inbox.
//!
//! A `tokio::sync::mpsc` channel gives FIFO ordering and bounded-capacity
//! backpressure for free, with an atomic counter layered on top for
//! `len`/`is_empty` observability.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::message::ActorMessage;

/// A single actor's inbox: bounded, FIFO, single consumer.
pub struct Inbox {
    sender: mpsc::Sender<ActorMessage>,
    receiver: Mutex<mpsc::Receiver<ActorMessage>>,
    len: AtomicUsize,
}

impl Inbox {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            receiver: Mutex::new(receiver),
            len: AtomicUsize::new(0),
        }
    }

    /// Enqueue a message. Blocks only long enough for the bound to clear —
    /// never forever, since the consumer is always the owning actor's
    /// runner task.
    pub async fn push(&self, message: ActorMessage) {
        if self.sender.send(message).await.is_ok() {
            self.len.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Enqueue without awaiting, used for best-effort synchronous delivery
    /// paths where no task can be awaited (e.g. teardown notifications
    /// fired outside a runtime). Drops the message if the inbox is full.
    pub fn try_push(&self, message: ActorMessage) {
        if self.sender.try_send(message).is_ok() {
            self.len.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Drain everything currently available without blocking.
    pub async fn drain_nonblocking(&self) -> Vec<ActorMessage> {
        let mut receiver = self.receiver.lock().await;
        let mut batch = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            self.len.fetch_sub(1, Ordering::SeqCst);
            batch.push(message);
        }
        batch
    }

    /// Wait for the next message, up to `timeout`. Returns `None` on
    /// timeout; never errors.
    pub async fn recv_timeout(&self, timeout: Duration) -> Option<ActorMessage> {
        let mut receiver = self.receiver.lock().await;
        match tokio::time::timeout(timeout, receiver.recv()).await {
            Ok(Some(message)) => {
                self.len.fetch_sub(1, Ordering::SeqCst);
                Some(message)
            }
            Ok(None) | Err(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::ids::ActorId;

    fn msg(content: &str) -> ActorMessage {
        ActorMessage::new(ActorId::new(), ActorId::new(), content, None)
    }

    #[tokio::test]
    async fn fifo_ordering_preserved() {
        let inbox = Inbox::new(8);
        inbox.push(msg("a")).await;
        inbox.push(msg("b")).await;
        let batch = inbox.drain_nonblocking().await;
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].content, "a");
        assert_eq!(batch[1].content, "b");
    }

    #[tokio::test]
    async fn recv_timeout_returns_none_when_empty() {
        let inbox = Inbox::new(8);
        let result = inbox.recv_timeout(Duration::from_millis(20)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn len_tracks_pending_messages() {
        let inbox = Inbox::new(8);
        assert!(inbox.is_empty());
        inbox.push(msg("a")).await;
        assert_eq!(inbox.len(), 1);
        inbox.drain_nonblocking().await;
        assert!(inbox.is_empty());
    }
}
