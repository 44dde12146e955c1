use thiserror::Error;

/// The result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while starting or running the frontend.
#[derive(Debug, Error)]
pub enum Error {
    /// Server already started.
    #[error("server already started")]
    AlreadyStarted,

    /// Failed to bind the listener.
    #[error("failed to bind listener: {0}")]
    Bind(#[source] std::io::Error),

    /// The in-memory demo backend failed to attach to the bus.
    #[error("demo backend error: {0}")]
    DemoBackend(#[from] raleur_bus_memory::Error),

    /// A port setting could not be parsed.
    #[error("invalid port: {0}")]
    InvalidPort(String),

    /// A topic setting is not a valid subject.
    #[error(transparent)]
    InvalidTopic(#[from] raleur_bus::InvalidTopic),

    /// Metrics could not be registered.
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Waiting for the shutdown signal failed.
    #[error("failed to listen for shutdown signal: {0}")]
    Signal(#[source] std::io::Error),

    /// The span exporter could not be built.
    #[error("failed to build span exporter: {0}")]
    TracerInit(#[from] opentelemetry::trace::TraceError),

    /// The global subscriber could not be installed.
    #[error(transparent)]
    Tracing(#[from] tracing_subscriber::util::TryInitError),
}
