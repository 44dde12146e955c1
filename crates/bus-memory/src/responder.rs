use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::debug;

pub(crate) type PendingRequest = (Bytes, oneshot::Sender<Bytes>);

/// A trait representing the answering side of a request/reply topic.
#[async_trait]
pub trait RequestHandler
where
    Self: Clone + Debug + Send + Sync + 'static,
{
    /// Handles a request. Returning `None` leaves the request unanswered.
    async fn handle(&self, topic: String, payload: Bytes) -> Option<Bytes>;
}

/// Answers requests on a topic until stopped or dropped.
#[derive(Debug)]
pub struct MemoryResponder {
    stop_sender: watch::Sender<()>,
}

impl MemoryResponder {
    pub(crate) fn spawn<X>(
        topic: String,
        mut receiver: mpsc::Receiver<PendingRequest>,
        handler: X,
    ) -> Self
    where
        X: RequestHandler,
    {
        let (stop_sender, mut stop_receiver) = watch::channel(());

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop_receiver.changed() => {
                        break;
                    }
                    request = receiver.recv() => {
                        let Some((payload, reply)) = request else {
                            break;
                        };
                        if let Some(response) = handler.handle(topic.clone(), payload).await {
                            // Requester may have timed out already.
                            let _ = reply.send(response);
                        }
                    }
                }
            }
            debug!(%topic, "responder stopped");
        });

        Self { stop_sender }
    }

    /// Stops answering requests.
    pub fn stop(&self) {
        let _ = self.stop_sender.send(());
    }
}
