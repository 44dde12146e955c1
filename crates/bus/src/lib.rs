//! Abstract interface for publish/subscribe and request/reply messaging.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod topic;

pub use topic::{InvalidTopic, Topic};

use std::error::Error;
use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

/// Marker trait for message bus errors
pub trait MessageBusError: Debug + Error + Send + Sync + 'static {
    /// Whether no reply arrived in time. Having no responder at all counts too.
    fn is_timeout(&self) -> bool;

    /// Whether the bus could not be reached.
    fn is_disconnected(&self) -> bool;
}

/// A trait representing a connection to a message bus.
///
/// Handles are cheap to clone and every clone shares the same underlying
/// connection, so a single handle can serve all concurrent requests.
#[async_trait]
pub trait MessageBus
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// The error type for the bus.
    type Error: MessageBusError;

    /// Publishes a payload to a topic without waiting for any acknowledgement.
    ///
    /// Delivery is at most once: a message published while nobody listens is lost.
    async fn publish(&self, topic: &Topic, payload: Bytes) -> Result<(), Self::Error>;

    /// Sends a request to a topic and waits for a single reply.
    ///
    /// Fails with a timeout-class error if no reply arrives within `timeout`.
    async fn request(
        &self,
        topic: &Topic,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, Self::Error>;
}
