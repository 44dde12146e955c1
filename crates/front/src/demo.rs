//! A stand-in backend for local runs on the in-process bus.

use crate::record::Record;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use raleur_bus::Topic;
use raleur_bus_memory::{MemoryBus, MemoryResponder, MemorySubscription, RequestHandler};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
struct RecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

#[async_trait]
impl RequestHandler for RecordStore {
    async fn handle(&self, topic: String, _payload: Bytes) -> Option<Bytes> {
        let records = self.records.read().await;
        debug!(%topic, count = records.len(), "answering record request");

        match serde_json::to_vec(&*records) {
            Ok(reply) => Some(Bytes::from(reply)),
            Err(e) => {
                warn!(error = %e, "failed to encode records");
                None
            }
        }
    }
}

/// Stores posts published on one topic and serves them on another.
#[derive(Debug)]
pub struct DemoBackend {
    responder: MemoryResponder,
    ingest: JoinHandle<()>,
}

impl DemoBackend {
    /// Attaches the backend to `bus`.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus is disconnected.
    pub async fn start(
        bus: &MemoryBus,
        post_topic: &Topic,
        get_topic: &Topic,
    ) -> Result<Self, raleur_bus_memory::Error> {
        let store = RecordStore::default();

        let subscription = bus.subscribe(post_topic).await?;
        let responder = bus.respond(get_topic, store.clone()).await?;
        let ingest = tokio::spawn(ingest(subscription, store));

        info!(%post_topic, %get_topic, "demo backend started");

        Ok(Self { responder, ingest })
    }

    /// Stops ingesting and answering.
    pub fn stop(&self) {
        self.responder.stop();
        self.ingest.abort();
    }
}

async fn ingest(mut subscription: MemorySubscription, store: RecordStore) {
    while let Some(payload) = subscription.next().await {
        let mut record = match serde_json::from_slice::<Record>(&payload) {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "ignoring malformed post");
                continue;
            }
        };

        record.id = Uuid::new_v4().to_string();
        record.date = Utc::now().to_rfc3339();

        debug!(id = %record.id, "post stored");
        store.records.write().await.insert(0, record);
    }
}
