use crate::error::{Error, Result};

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use raleur_bus::Topic;

/// Command line and environment settings.
#[derive(Parser, Clone, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Host of the NATS server
    #[arg(long, env = "NATSURL", default_value = "demo.nats.io")]
    pub nats_url: String,

    /// Port of the NATS server, with or without a leading colon
    #[arg(long, env = "NATSPORT", default_value = ":4222")]
    pub nats_port: String,

    /// Topic new posts are published on
    #[arg(long, env = "NATSPOST", default_value = "zjnO12CgNkHD0IsuGd89zA")]
    pub nats_post: String,

    /// Topic the record list is requested on
    #[arg(long, env = "NATSGET", default_value = "OWM7pKQNbXd7l75l21kOzA")]
    pub nats_get: String,

    /// HTTP listen port, with or without a leading colon
    #[arg(long, env = "HS-MICRO-FRONT", default_value = ":8080")]
    pub port: String,

    /// Seconds to wait for the record list
    #[arg(long, env = "FETCH_TIMEOUT", default_value_t = 3)]
    pub fetch_timeout: u64,

    /// Directory served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "./static")]
    pub static_dir: PathBuf,

    /// Use an in-process bus with a demo backend instead of NATS
    #[arg(long, env = "MEMORY_BUS")]
    pub memory_bus: bool,

    /// Log at debug level
    #[arg(long)]
    pub debug: bool,

    /// OTLP/HTTP endpoint spans are exported to
    #[arg(long, env = "OTEL_EXPORTER_OTLP_TRACES_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

/// Resolved settings.
#[derive(Clone, Debug)]
pub struct Config {
    /// NATS server URL.
    pub nats_address: String,

    /// Topic new posts are published on.
    pub post_topic: Topic,

    /// Topic the record list is requested on.
    pub get_topic: Topic,

    /// HTTP listen address.
    pub listen_addr: SocketAddr,

    /// How long to wait for the record list.
    pub fetch_timeout: Duration,

    /// Directory served under /static.
    pub static_dir: PathBuf,

    /// Whether to run against the in-process bus.
    pub memory_bus: bool,

    /// Where spans are exported, if anywhere.
    pub otlp_endpoint: Option<String>,
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self> {
        let nats_port = parse_port(&args.nats_port)?;
        let http_port = parse_port(&args.port)?;

        Ok(Self {
            nats_address: format!("nats://{}:{nats_port}", args.nats_url),
            post_topic: Topic::new(args.nats_post)?,
            get_topic: Topic::new(args.nats_get)?,
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, http_port)),
            fetch_timeout: Duration::from_secs(args.fetch_timeout),
            static_dir: args.static_dir,
            memory_bus: args.memory_bus,
            otlp_endpoint: args.otlp_endpoint.filter(|endpoint| !endpoint.trim().is_empty()),
        })
    }
}

/// Accepts both `:4222` and `4222`.
fn parse_port(value: &str) -> Result<u16> {
    let trimmed = value.trim();
    trimmed
        .strip_prefix(':')
        .unwrap_or(trimmed)
        .parse()
        .map_err(|_| Error::InvalidPort(value.to_string()))
}
