//! Log output and OpenTelemetry span export.

use crate::error::Result;

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::TracerProvider;
use opentelemetry_sdk::{Resource, runtime};
use tracing::{Level, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const SERVICE_NAME: &str = "raleur-front";

/// Flushes and shuts down span export on drop.
pub struct TracingGuard {
    provider: TracerProvider,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Err(e) = self.provider.shutdown() {
            eprintln!("Error shutting down tracer provider: {e:?}");
        }
    }
}

/// Builds the tracer provider. Spans are exported over OTLP/HTTP when an
/// endpoint is given and only propagated otherwise.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built.
pub fn tracer_provider(otlp_endpoint: Option<&str>) -> Result<TracerProvider> {
    let mut builder = TracerProvider::builder().with_resource(Resource::new(vec![
        KeyValue::new("service.name", SERVICE_NAME),
        KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
    ]));

    if let Some(endpoint) = otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .build()?;
        builder = builder.with_batch_exporter(exporter, runtime::Tokio);
    }

    Ok(builder.build())
}

/// Installs the global subscriber: formatted logs at `level` plus an
/// OpenTelemetry layer.
///
/// # Errors
///
/// Returns an error if the exporter cannot be built or a global subscriber
/// is already installed.
pub fn init_tracing(level: Level, otlp_endpoint: Option<&str>) -> Result<TracingGuard> {
    let provider = tracer_provider(otlp_endpoint)?;
    let tracer = provider.tracer(SERVICE_NAME);

    tracing_subscriber::registry()
        .with(LevelFilter::from_level(level))
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .try_init()?;

    match otlp_endpoint {
        Some(endpoint) => info!(%endpoint, "exporting spans over otlp"),
        None => info!("no otlp endpoint configured, spans are not exported"),
    }

    Ok(TracingGuard { provider })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_provider_without_endpoint() {
        let provider = tracer_provider(None).unwrap();

        assert!(provider.shutdown().is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_provider_with_endpoint() {
        let provider = tracer_provider(Some("http://127.0.0.1:4318/v1/traces")).unwrap();

        let _guard = TracingGuard { provider };
    }
}
