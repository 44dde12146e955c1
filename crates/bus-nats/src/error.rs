use std::time::Duration;

use raleur_bus::MessageBusError;
use thiserror::Error;

/// Errors that can occur when using the NATS bus.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to connect to the NATS server.
    #[error("failed to connect to {address}: {source}")]
    Connect {
        /// The address that was dialed.
        address: String,

        /// The underlying connection error.
        #[source]
        source: async_nats::ConnectError,
    },

    /// Failed to flush pending messages.
    #[error("failed to flush: {0}")]
    Flush(async_nats::client::FlushErrorKind),

    /// No responders on the requested subject.
    #[error("no responders on subject {0}")]
    NoResponders(String),

    /// No connection has been established (yet).
    #[error("not connected to nats")]
    NotConnected,

    /// Publish error.
    #[error("failed to publish: {0}")]
    Publish(async_nats::client::PublishErrorKind),

    /// Request error other than a timeout.
    #[error("failed to request: {0}")]
    Request(async_nats::client::RequestErrorKind),

    /// No reply arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl MessageBusError for Error {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::NoResponders(_) | Self::Timeout(_))
    }

    fn is_disconnected(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::NotConnected)
    }
}
