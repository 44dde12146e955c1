//! NATS implementation of the message bus.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod error;

pub use error::Error;

use std::sync::Arc;
use std::time::Duration;

use async_nats::client::RequestErrorKind;
use async_nats::{Client, ConnectOptions, Request};
use async_trait::async_trait;
use bytes::Bytes;
use raleur_bus::{MessageBus, Topic};
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Options for connecting to NATS.
#[derive(Clone, Debug)]
pub struct NatsBusOptions {
    /// Server address, e.g. `nats://demo.nats.io:4222`.
    pub address: String,

    /// Name this client reports to the server.
    pub client_name: Option<String>,

    /// How long a single connection attempt may take. Defaults to 5 seconds if not set.
    pub connection_timeout: Option<Duration>,
}

/// A NATS-backed message bus.
///
/// All clones share one connection, which is closed once the last clone is dropped.
#[derive(Clone, Debug)]
pub struct NatsBus {
    address: String,
    client: Arc<OnceCell<Client>>,
}

impl NatsBus {
    /// Connects to NATS, waiting for the connection to be established.
    ///
    /// # Errors
    ///
    /// Returns `Error::Connect` if the server cannot be reached.
    pub async fn connect(options: NatsBusOptions) -> Result<Self, Error> {
        let client = Self::connect_client(&options).await?;
        info!(address = %options.address, "connected to nats");

        Ok(Self {
            address: options.address,
            client: Arc::new(OnceCell::new_with(Some(client))),
        })
    }

    /// Returns a handle immediately and connects on a background task.
    ///
    /// Connection failures are logged. Until a connection exists every
    /// operation fails with `Error::NotConnected`.
    #[must_use]
    pub fn connect_in_background(options: NatsBusOptions) -> (Self, JoinHandle<()>) {
        let bus = Self {
            address: options.address.clone(),
            client: Arc::new(OnceCell::new()),
        };

        let cell = bus.client.clone();
        let handle = tokio::spawn(async move {
            match Self::connect_client(&options).await {
                Ok(client) => {
                    info!(address = %options.address, "connected to nats");
                    let _ = cell.set(client);
                }
                Err(e) => {
                    error!(error = %e, "nats connection failed");
                }
            }
        });

        (bus, handle)
    }

    async fn connect_client(options: &NatsBusOptions) -> Result<Client, Error> {
        let mut connect_options = ConnectOptions::new()
            .connection_timeout(options.connection_timeout.unwrap_or(Duration::from_secs(5)));
        if let Some(name) = &options.client_name {
            connect_options = connect_options.name(name);
        }

        connect_options
            .connect(options.address.as_str())
            .await
            .map_err(|source| Error::Connect {
                address: options.address.clone(),
                source,
            })
    }

    /// Returns the server address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Whether a connection has been established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// Flushes messages still buffered locally.
    ///
    /// # Errors
    ///
    /// Returns `Error::Flush` if the buffered messages could not be written.
    pub async fn close(&self) -> Result<(), Error> {
        if let Some(client) = self.client.get() {
            client.flush().await.map_err(|e| Error::Flush(e.kind()))?;
            debug!(address = %self.address, "flushed nats connection");
        }
        Ok(())
    }

    fn client(&self) -> Result<&Client, Error> {
        self.client.get().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    type Error = Error;

    #[instrument(skip(self, payload), fields(len = payload.len()))]
    async fn publish(&self, topic: &Topic, payload: Bytes) -> Result<(), Self::Error> {
        self.client()?
            .publish(topic.to_string(), payload)
            .await
            .map_err(|e| Error::Publish(e.kind()))
    }

    #[instrument(skip(self, payload), fields(len = payload.len()))]
    async fn request(
        &self,
        topic: &Topic,
        payload: Bytes,
        timeout: Duration,
    ) -> Result<Bytes, Self::Error> {
        let client = self.client()?;
        let request = Request::new().payload(payload).timeout(Some(timeout));

        match tokio::time::timeout(timeout, client.send_request(topic.to_string(), request)).await {
            Err(_) => Err(Error::Timeout(timeout)),
            Ok(Ok(message)) => Ok(message.payload),
            Ok(Err(e)) => match e.kind() {
                RequestErrorKind::TimedOut => Err(Error::Timeout(timeout)),
                RequestErrorKind::NoResponders => Err(Error::NoResponders(topic.to_string())),
                kind => Err(Error::Request(kind)),
            },
        }
    }
}
