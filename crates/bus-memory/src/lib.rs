//! In-memory (single process) implementation of the message bus for tests and local development.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;
mod responder;
mod subscription;

pub use error::Error;
pub use responder::{MemoryResponder, RequestHandler};
pub use subscription::MemorySubscription;

use responder::PendingRequest;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use raleur_bus::{MessageBus, Topic};
use tokio::sync::{Mutex, broadcast, mpsc, oneshot};
use tracing::debug;

const SUBSCRIPTION_CAPACITY: usize = 100;
const RESPONDER_CAPACITY: usize = 100;

#[derive(Debug)]
struct BusState {
    connected: bool,
    subscribers: HashMap<String, broadcast::Sender<Bytes>>,
    responders: HashMap<String, mpsc::Sender<PendingRequest>>,
}

impl Default for BusState {
    fn default() -> Self {
        Self {
            connected: true,
            subscribers: HashMap::new(),
            responders: HashMap::new(),
        }
    }
}

/// In-memory message bus.
#[derive(Clone, Debug, Default)]
pub struct MemoryBus {
    state: Arc<Mutex<BusState>>,
}

impl MemoryBus {
    /// Creates a new, connected instance of `MemoryBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing the broker. Every operation fails until `reconnect`.
    pub async fn disconnect(&self) {
        self.state.lock().await.connected = false;
    }

    /// Restores a connection lost with `disconnect`.
    pub async fn reconnect(&self) {
        self.state.lock().await.connected = true;
    }

    /// Subscribes to every message published on `topic` from now on.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the bus is disconnected.
    pub async fn subscribe(&self, topic: &Topic) -> Result<MemorySubscription, Error> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(Error::Disconnected);
        }

        let receiver = state
            .subscribers
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(SUBSCRIPTION_CAPACITY).0)
            .subscribe();

        Ok(MemorySubscription::new(topic.to_string(), receiver))
    }

    /// Answers requests sent to `topic` with `handler`, replacing any previous responder.
    ///
    /// # Errors
    ///
    /// Returns `Error::Disconnected` if the bus is disconnected.
    pub async fn respond<X>(&self, topic: &Topic, handler: X) -> Result<MemoryResponder, Error>
    where
        X: RequestHandler,
    {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(Error::Disconnected);
        }

        let (sender, receiver) = mpsc::channel(RESPONDER_CAPACITY);
        if state.responders.insert(topic.to_string(), sender).is_some() {
            debug!(%topic, "replaced existing responder");
        }

        Ok(MemoryResponder::spawn(topic.to_string(), receiver, handler))
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    type Error = Error;

    async fn publish(&self, topic: &Topic, payload: Bytes) -> Result<(), Self::Error> {
        let mut state = self.state.lock().await;
        if !state.connected {
            return Err(Error::Disconnected);
        }

        if let Some(sender) = state.subscribers.get(topic.as_str()) {
            if sender.send(payload).is_err() {
                // Every subscription is gone.
                state.subscribers.remove(topic.as_str());
            }
        }

        Ok(())
    }

    async fn request(
        &self,
        topic: &Topic,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, Self::Error> {
        let sender = {
            let state = self.state.lock().await;
            if !state.connected {
                return Err(Error::Disconnected);
            }
            state.responders.get(topic.as_str()).cloned()
        };

        let sender = sender.ok_or_else(|| Error::NoResponders(topic.to_string()))?;

        // Queueing behind a busy responder counts against the same deadline.
        let exchange = async {
            let (reply_sender, reply_receiver) = oneshot::channel();
            sender
                .send((payload, reply_sender))
                .await
                .map_err(|_| Error::NoResponders(topic.to_string()))?;

            reply_receiver.await.map_err(|_| Error::NoReply)
        };

        tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| Error::Timeout(timeout))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_matches::assert_matches;
    use raleur_bus::MessageBusError;

    #[derive(Clone, Debug)]
    struct EchoHandler;

    #[async_trait]
    impl RequestHandler for EchoHandler {
        async fn handle(&self, _topic: String, payload: Bytes) -> Option<Bytes> {
            Some(payload)
        }
    }

    #[derive(Clone, Debug)]
    struct SilentHandler;

    #[async_trait]
    impl RequestHandler for SilentHandler {
        async fn handle(&self, _topic: String, _payload: Bytes) -> Option<Bytes> {
            None
        }
    }

    #[derive(Clone, Debug)]
    struct SlowHandler(Duration);

    #[async_trait]
    impl RequestHandler for SlowHandler {
        async fn handle(&self, _topic: String, payload: Bytes) -> Option<Bytes> {
            tokio::time::sleep(self.0).await;
            Some(payload)
        }
    }

    fn topic(name: &str) -> Topic {
        Topic::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_publish_reaches_subscribers_in_order() {
        let bus = MemoryBus::new();
        let mut first = bus.subscribe(&topic("posts")).await.unwrap();
        let mut second = bus.subscribe(&topic("posts")).await.unwrap();

        bus.publish(&topic("posts"), Bytes::from("message1"))
            .await
            .unwrap();
        bus.publish(&topic("posts"), Bytes::from("message2"))
            .await
            .unwrap();

        assert_eq!(first.next().await, Some(Bytes::from("message1")));
        assert_eq!(first.next().await, Some(Bytes::from("message2")));
        assert_eq!(second.next().await, Some(Bytes::from("message1")));
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_dropped() {
        let bus = MemoryBus::new();

        bus.publish(&topic("posts"), Bytes::from("lost"))
            .await
            .unwrap();

        let mut late = bus.subscribe(&topic("posts")).await.unwrap();
        bus.publish(&topic("posts"), Bytes::from("seen"))
            .await
            .unwrap();

        assert_eq!(late.next().await, Some(Bytes::from("seen")));
    }

    #[tokio::test]
    async fn test_publish_is_scoped_to_topic() {
        let bus = MemoryBus::new();
        let mut other = bus.subscribe(&topic("other")).await.unwrap();

        bus.publish(&topic("posts"), Bytes::from("message"))
            .await
            .unwrap();
        bus.publish(&topic("other"), Bytes::from("mine"))
            .await
            .unwrap();

        assert_eq!(other.next().await, Some(Bytes::from("mine")));
    }

    #[tokio::test]
    async fn test_request_reply() {
        let bus = MemoryBus::new();
        let _responder = bus.respond(&topic("get"), EchoHandler).await.unwrap();

        let reply = bus
            .request(&topic("get"), Bytes::from("ping"), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(reply, Bytes::from("ping"));
    }

    #[tokio::test]
    async fn test_request_without_responder() {
        let bus = MemoryBus::new();

        let result = bus
            .request(&topic("get"), Bytes::new(), Duration::from_secs(1))
            .await;

        assert_matches!(result, Err(Error::NoResponders(ref t)) if t == "get");
        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_request_times_out() {
        let bus = MemoryBus::new();
        let _responder = bus
            .respond(&topic("get"), SlowHandler(Duration::from_secs(5)))
            .await
            .unwrap();

        let result = bus
            .request(&topic("get"), Bytes::new(), Duration::from_millis(50))
            .await;

        assert_matches!(result, Err(Error::Timeout(d)) if d == Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_request_times_out_behind_saturated_responder() {
        let bus = MemoryBus::new();
        let _responder = bus
            .respond(&topic("get"), SlowHandler(Duration::from_secs(3600)))
            .await
            .unwrap();

        // The first request occupies the handler, the rest fill its queue.
        for _ in 0..=RESPONDER_CAPACITY {
            let result = bus
                .request(&topic("get"), Bytes::new(), Duration::from_millis(5))
                .await;
            assert_matches!(result, Err(Error::Timeout(_)));
        }

        let result = tokio::time::timeout(
            Duration::from_secs(2),
            bus.request(&topic("get"), Bytes::new(), Duration::from_millis(5)),
        )
        .await
        .expect("request must not outlive its own timeout");

        assert_matches!(result, Err(Error::Timeout(d)) if d == Duration::from_millis(5));
    }

    #[tokio::test]
    async fn test_request_left_unanswered() {
        let bus = MemoryBus::new();
        let _responder = bus.respond(&topic("get"), SilentHandler).await.unwrap();

        let result = bus
            .request(&topic("get"), Bytes::new(), Duration::from_secs(1))
            .await;

        assert_matches!(result, Err(Error::NoReply));
    }

    #[tokio::test]
    async fn test_stopped_responder_stops_answering() {
        let bus = MemoryBus::new();
        let responder = bus.respond(&topic("get"), EchoHandler).await.unwrap();
        responder.stop();

        // Give the responder task a chance to observe the stop signal.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let result = bus
            .request(&topic("get"), Bytes::new(), Duration::from_millis(200))
            .await;

        assert!(result.unwrap_err().is_timeout());
    }

    #[tokio::test]
    async fn test_disconnect_and_reconnect() {
        let bus = MemoryBus::new();
        let _responder = bus.respond(&topic("get"), EchoHandler).await.unwrap();

        bus.disconnect().await;

        let publish = bus.publish(&topic("posts"), Bytes::new()).await;
        assert_matches!(publish, Err(Error::Disconnected));
        assert!(publish.unwrap_err().is_disconnected());

        let request = bus
            .request(&topic("get"), Bytes::new(), Duration::from_secs(1))
            .await;
        assert_matches!(request, Err(Error::Disconnected));

        assert_matches!(
            bus.subscribe(&topic("posts")).await,
            Err(Error::Disconnected)
        );

        bus.reconnect().await;

        let reply = bus
            .request(&topic("get"), Bytes::from("back"), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(reply, Bytes::from("back"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let bus = MemoryBus::new();
        let clone = bus.clone();
        let mut subscription = bus.subscribe(&topic("posts")).await.unwrap();

        clone
            .publish(&topic("posts"), Bytes::from("shared"))
            .await
            .unwrap();

        assert_eq!(subscription.next().await, Some(Bytes::from("shared")));
    }
}
