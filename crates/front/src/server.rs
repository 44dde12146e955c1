use crate::error::{Error, Result};

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::OnceLock;

use axum::Router;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

/// Plain HTTP server for the frontend router.
#[derive(Debug)]
pub struct HttpServer {
    listen_addr: SocketAddr,
    local_addr: OnceLock<SocketAddr>,
    shutdown_token: CancellationToken,
    task_tracker: TaskTracker,
}

impl HttpServer {
    /// Creates a new instance of `HttpServer`.
    #[must_use]
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            local_addr: OnceLock::new(),
            shutdown_token: CancellationToken::new(),
            task_tracker: TaskTracker::new(),
        }
    }

    /// The address actually bound, once started.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Binds the listener and serves `router` until shut down.
    ///
    /// # Errors
    ///
    /// Returns `Error::AlreadyStarted` on a second call, and `Error::Bind` if
    /// the listen address is unavailable.
    pub async fn start(&self, router: Router) -> Result<JoinHandle<()>> {
        if self.task_tracker.is_closed() {
            return Err(Error::AlreadyStarted);
        }

        let listener = tokio::net::TcpListener::bind(self.listen_addr)
            .await
            .map_err(Error::Bind)?;
        let local_addr = listener.local_addr().map_err(Error::Bind)?;
        let _ = self.local_addr.set(local_addr);

        info!(%local_addr, "http server listening");

        let shutdown_token = self.shutdown_token.clone();
        let handle = self.task_tracker.spawn(async move {
            tokio::select! {
                e = axum::serve(listener, router.into_make_service()).into_future() => {
                    info!("http server exited {:?}", e);
                }
                () = shutdown_token.cancelled() => {}
            };
        });

        self.task_tracker.close();

        Ok(handle)
    }

    /// Stops serving and waits for the server task to finish.
    pub async fn shutdown(&self) {
        info!("http server shutting down...");

        self.shutdown_token.cancel();
        self.task_tracker.wait().await;

        info!("http server shutdown");
    }
}
