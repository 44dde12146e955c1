use crate::metrics::Metrics;
use crate::record::Record;
use crate::status::StatusToken;

use raleur_bus::{MessageBus, MessageBusError, Topic};
use tracing::{error, info, instrument};

/// Publishes new posts to the backend.
#[derive(Clone, Debug)]
pub struct PostDispatcher<B> {
    bus: B,
    topic: Topic,
    metrics: Metrics,
}

impl<B> PostDispatcher<B>
where
    B: MessageBus,
{
    /// Creates a new instance of `PostDispatcher`.
    #[must_use]
    pub const fn new(bus: B, topic: Topic, metrics: Metrics) -> Self {
        Self { bus, topic, metrics }
    }

    /// Publishes a post and reports the outcome as a status token.
    ///
    /// Neither field is validated, and nothing is retried: each call is one publish.
    #[instrument(skip_all, fields(topic = %self.topic))]
    pub async fn dispatch(&self, title: String, content: String) -> StatusToken {
        let record = Record::submission(title, content);

        let payload = match record.to_bytes() {
            Ok(payload) => payload,
            Err(e) => {
                error!(error = %e, "failed to serialize post");
                self.metrics.post_failed();
                return StatusToken::Failed;
            }
        };

        match self.bus.publish(&self.topic, payload).await {
            Ok(()) => {
                info!("new post published");
                self.metrics.post_published();
                StatusToken::Published
            }
            Err(e) => {
                if e.is_disconnected() {
                    error!(error = %e, "bus unavailable, failed to publish post");
                } else {
                    error!(error = %e, "failed to publish post");
                }
                self.metrics.post_failed();
                StatusToken::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use raleur_bus_memory::MemoryBus;
    use tracing_test::traced_test;

    fn dispatcher(bus: &MemoryBus) -> PostDispatcher<MemoryBus> {
        PostDispatcher::new(
            bus.clone(),
            Topic::new("posts").unwrap(),
            Metrics::new().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_dispatch_publishes_submission() {
        let bus = MemoryBus::new();
        let mut subscription = bus.subscribe(&Topic::new("posts").unwrap()).await.unwrap();

        let token = dispatcher(&bus)
            .dispatch("Hello".to_string(), "World".to_string())
            .await;

        assert_eq!(token, StatusToken::Published);
        let payload = subscription.next().await.unwrap();
        assert_eq!(
            serde_json::from_slice::<Record>(&payload).unwrap(),
            Record::submission("Hello", "World")
        );
    }

    #[tokio::test]
    async fn test_dispatch_without_listeners_still_succeeds() {
        let bus = MemoryBus::new();

        let token = dispatcher(&bus).dispatch(String::new(), String::new()).await;

        assert_eq!(token, StatusToken::Published);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_dispatch_failure_yields_failed_token() {
        let bus = MemoryBus::new();
        bus.disconnect().await;

        let dispatcher = dispatcher(&bus);
        let token = dispatcher
            .dispatch("Hello".to_string(), "World".to_string())
            .await;

        assert_eq!(token, StatusToken::Failed);
        assert!(logs_contain("failed to publish post"));
        assert!(
            dispatcher
                .metrics
                .render()
                .unwrap()
                .contains(r#"raleur_posts_total{status="failed"} 1"#)
        );
    }

    #[tokio::test]
    async fn test_double_submit_publishes_twice() {
        let bus = MemoryBus::new();
        let mut subscription = bus.subscribe(&Topic::new("posts").unwrap()).await.unwrap();
        let dispatcher = dispatcher(&bus);

        for _ in 0..2 {
            dispatcher
                .dispatch("Same".to_string(), "Post".to_string())
                .await;
        }

        assert_eq!(subscription.next().await, subscription.next().await);
    }
}
