//! Binary serving the frontend.
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

use clap::Parser;
use raleur_bus::MessageBus;
use raleur_bus_memory::MemoryBus;
use raleur_bus_nats::{NatsBus, NatsBusOptions};
use raleur_front::{
    AppState, Args, Config, DemoBackend, Error, HttpServer, Metrics, Result, init_tracing,
};
use tracing::{Level, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let config = Config::try_from(args)?;
    let _tracing = init_tracing(level, config.otlp_endpoint.as_deref())?;
    let metrics = Metrics::new()?;

    if config.memory_bus {
        info!("using in-memory bus");
        let bus = MemoryBus::new();
        let backend = DemoBackend::start(&bus, &config.post_topic, &config.get_topic).await?;

        serve(bus, &config, metrics).await?;

        backend.stop();
    } else {
        let (bus, _connect_handle) = NatsBus::connect_in_background(NatsBusOptions {
            address: config.nats_address.clone(),
            client_name: Some("raleur-front".to_string()),
            connection_timeout: None,
        });

        serve(bus.clone(), &config, metrics).await?;

        if let Err(e) = bus.close().await {
            error!(error = %e, "failed to flush nats connection");
        }
    }

    Ok(())
}

async fn serve<B>(bus: B, config: &Config, metrics: Metrics) -> Result<()>
where
    B: MessageBus,
{
    let state = AppState::new(bus, config, metrics);
    let router = raleur_front::router(state, &config.static_dir);

    let server = HttpServer::new(config.listen_addr);
    let server_handle = server.start(router).await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.map_err(Error::Signal)?;
            info!("shutdown signal received");
        }
        _ = server_handle => {
            error!("http server stopped unexpectedly");
        }
    }

    server.shutdown().await;

    Ok(())
}
