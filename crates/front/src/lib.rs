//! Web frontend that relays posts to a message bus and reads them back.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_pub_crate)]

mod config;
mod demo;
mod dispatcher;
mod error;
mod fetcher;
mod handlers;
mod metrics;
mod pages;
mod record;
mod server;
mod status;
mod telemetry;
mod trace;

pub use config::{Args, Config};
pub use demo::DemoBackend;
pub use dispatcher::PostDispatcher;
pub use error::{Error, Result};
pub use fetcher::{FetchError, RecordFetcher};
pub use metrics::Metrics;
pub use record::Record;
pub use server::HttpServer;
pub use status::{STATUS_COOKIE, Status, StatusToken};
pub use telemetry::{TracingGuard, init_tracing, tracer_provider};
pub use trace::TraceCarrier;

use handlers::{
    index_handler, metrics_handler, new_post_handler, status_handler, submit_post_handler,
};

use std::path::Path;

use axum::Router;
use axum::routing::{get, post};
use raleur_bus::MessageBus;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Shared state handed to every handler.
#[derive(Clone, Debug)]
pub struct AppState<B> {
    /// Publishes new posts.
    pub dispatcher: PostDispatcher<B>,

    /// Fetches the record list.
    pub fetcher: RecordFetcher<B>,

    /// Counters exposed on `/metrics`.
    pub metrics: Metrics,
}

impl<B> AppState<B>
where
    B: MessageBus,
{
    /// Builds the state for `bus` from the resolved settings.
    #[must_use]
    pub fn new(bus: B, config: &Config, metrics: Metrics) -> Self {
        Self {
            dispatcher: PostDispatcher::new(
                bus.clone(),
                config.post_topic.clone(),
                metrics.clone(),
            ),
            fetcher: RecordFetcher::new(
                bus,
                config.get_topic.clone(),
                config.fetch_timeout,
                metrics.clone(),
            ),
            metrics,
        }
    }
}

/// Builds the frontend router.
#[must_use]
pub fn router<B>(state: AppState<B>, static_dir: impl AsRef<Path>) -> Router
where
    B: MessageBus,
{
    Router::new()
        .route("/", get(index_handler::<B>))
        .route("/new", get(new_post_handler))
        .route("/api/post", post(submit_post_handler::<B>))
        .route("/api/status", get(status_handler))
        .route("/metrics", get(metrics_handler::<B>))
        .nest_service("/static", ServeDir::new(static_dir.as_ref()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
