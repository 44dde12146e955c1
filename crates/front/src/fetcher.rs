use crate::metrics::Metrics;
use crate::record::Record;
use crate::trace::TraceCarrier;

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use raleur_bus::{MessageBus, MessageBusError, Topic};
use thiserror::Error;
use tracing::{Span, debug, error, field, instrument, warn};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Errors that can occur while fetching records.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The trace carrier could not be serialized.
    #[error("failed to encode fetch request: {0}")]
    Encode(#[source] serde_json::Error),

    /// No reply arrived in time.
    #[error("no reply from backend within {0:?}")]
    Timeout(Duration),

    /// The bus failed for another reason.
    #[error("message bus error: {0}")]
    Bus(String),

    /// The reply was not a list of records.
    #[error("failed to decode backend reply: {0}")]
    Decode(#[source] serde_json::Error),
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::Encode(_) | Self::Bus(_) | Self::Decode(_) => StatusCode::BAD_GATEWAY,
        };

        (status, self.to_string()).into_response()
    }
}

/// Fetches the list of records from the backend.
#[derive(Clone, Debug)]
pub struct RecordFetcher<B> {
    bus: B,
    topic: Topic,
    timeout: Duration,
    metrics: Metrics,
}

impl<B> RecordFetcher<B>
where
    B: MessageBus,
{
    /// Creates a new instance of `RecordFetcher`.
    #[must_use]
    pub const fn new(bus: B, topic: Topic, timeout: Duration, metrics: Metrics) -> Self {
        Self {
            bus,
            topic,
            timeout,
            metrics,
        }
    }

    /// Sends one request carrying the context of its `fetch_records` span and
    /// decodes the reply.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Timeout` when the backend is silent, and
    /// `FetchError::Decode` when it answers with something other than records.
    #[instrument(
        name = "fetch_records",
        skip_all,
        fields(topic = %self.topic, trace_id = field::Empty)
    )]
    pub async fn fetch(&self) -> Result<Vec<Record>, FetchError> {
        let span = Span::current();
        let carrier = TraceCarrier::from_context(&span.context());
        match carrier.trace_id() {
            Some(trace_id) => {
                span.record("trace_id", trace_id);
            }
            None => debug!("no active trace, sending an empty carrier"),
        }

        let payload = carrier.to_bytes().map_err(|e| {
            self.metrics.fetch_error();
            FetchError::Encode(e)
        })?;

        let reply = match self.bus.request(&self.topic, payload, self.timeout).await {
            Ok(reply) => reply,
            Err(e) if e.is_timeout() => {
                warn!(error = %e, "backend did not answer in time");
                self.metrics.fetch_timeout();
                return Err(FetchError::Timeout(self.timeout));
            }
            Err(e) => {
                error!(error = %e, "fetch request failed");
                self.metrics.fetch_error();
                return Err(FetchError::Bus(e.to_string()));
            }
        };

        match Record::decode_collection(&reply) {
            Ok(records) => {
                debug!(count = records.len(), "records fetched");
                self.metrics.fetch_ok();
                Ok(records)
            }
            Err(e) => {
                error!(error = %e, "backend reply is not a record list");
                self.metrics.fetch_error();
                Err(FetchError::Decode(e))
            }
        }
    }
}
