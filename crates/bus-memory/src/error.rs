use std::time::Duration;

use raleur_bus::MessageBusError;
use thiserror::Error;

/// Errors that can occur when using the in-memory bus.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The bus was disconnected.
    #[error("in-memory bus is disconnected")]
    Disconnected,

    /// A responder accepted the request but dropped it without replying.
    #[error("responder dropped the request without replying")]
    NoReply,

    /// Nobody is responding on the topic.
    #[error("no responders on topic {0}")]
    NoResponders(String),

    /// No reply arrived in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl MessageBusError for Error {
    fn is_timeout(&self) -> bool {
        matches!(self, Self::NoReply | Self::NoResponders(_) | Self::Timeout(_))
    }

    fn is_disconnected(&self) -> bool {
        matches!(self, Self::Disconnected)
    }
}
