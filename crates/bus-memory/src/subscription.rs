use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::warn;

/// A subscription to a topic on the in-memory bus.
///
/// Only messages published after the subscription was created are received.
#[derive(Debug)]
pub struct MemorySubscription {
    topic: String,
    receiver: broadcast::Receiver<Bytes>,
}

impl MemorySubscription {
    pub(crate) const fn new(topic: String, receiver: broadcast::Receiver<Bytes>) -> Self {
        Self { topic, receiver }
    }

    /// Waits for the next message. Returns `None` once the bus is gone.
    pub async fn next(&mut self) -> Option<Bytes> {
        loop {
            match self.receiver.recv().await {
                Ok(payload) => return Some(payload),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(topic = %self.topic, skipped, "subscription lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
