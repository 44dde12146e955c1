use std::collections::HashMap;

use bytes::Bytes;
use opentelemetry::Context;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry_jaeger_propagator::Propagator;
use serde::{Deserialize, Serialize};

/// Propagation key understood by Jaeger-instrumented backends.
pub const PROPAGATION_KEY: &str = "uber-trace-id";

/// Trace propagation metadata sent as the payload of a fetch request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceCarrier {
    /// Propagation entries, keyed by header name.
    #[serde(rename = "TraceID")]
    pub trace_id: HashMap<String, String>,
}

impl TraceCarrier {
    /// Injects the span context of `cx` in Jaeger format.
    ///
    /// A context without a valid span yields an empty carrier.
    #[must_use]
    pub fn from_context(cx: &Context) -> Self {
        let mut trace_id = HashMap::new();
        Propagator::new().inject_context(cx, &mut trace_id);

        Self { trace_id }
    }

    /// Returns the trace id part of the propagation entry, if any.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id
            .get(PROPAGATION_KEY)
            .and_then(|value| value.split(':').next())
    }

    /// Serializes the carrier as a request payload.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if the carrier cannot be encoded.
    pub fn to_bytes(&self) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(self).map(Bytes::from)
    }
}
