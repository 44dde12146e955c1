//! Prometheus counters for posts and fetches.

use std::fmt;

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters exposed on `/metrics`.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    posts: IntCounterVec,
    fetches: IntCounterVec,
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    /// Creates the counters in a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a counter cannot be created or registered.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let posts = IntCounterVec::new(
            Opts::new("raleur_posts_total", "Total number of posts submitted"),
            &["status"],
        )?;
        registry.register(Box::new(posts.clone()))?;

        let fetches = IntCounterVec::new(
            Opts::new("raleur_fetches_total", "Total number of record fetches"),
            &["status"],
        )?;
        registry.register(Box::new(fetches.clone()))?;

        Ok(Self {
            registry,
            posts,
            fetches,
        })
    }

    pub(crate) fn post_published(&self) {
        self.posts.with_label_values(&["published"]).inc();
    }

    pub(crate) fn post_failed(&self) {
        self.posts.with_label_values(&["failed"]).inc();
    }

    pub(crate) fn fetch_ok(&self) {
        self.fetches.with_label_values(&["ok"]).inc();
    }

    pub(crate) fn fetch_timeout(&self) {
        self.fetches.with_label_values(&["timeout"]).inc();
    }

    pub(crate) fn fetch_error(&self) {
        self.fetches.with_label_values(&["error"]).inc();
    }

    /// Renders every counter in the Prometheus text format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metric families cannot be encoded.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
