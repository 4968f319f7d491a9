//! HDCP key service binary.
//!
//! # Usage
//!
//! ```bash
//! hdcp-keyserver --bind 127.0.0.1:8080 --master master-key.txt
//!
//! curl http://127.0.0.1:8080/keys/random_ksv
//! curl http://127.0.0.1:8080/keys/sink/00000fffff
//! ```

use std::path::PathBuf;

use clap::Parser;
use hdcp_keyserver::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// HDCP key service
#[derive(Parser, Debug)]
#[command(name = "hdcp-keyserver")]
#[command(about = "HTTP service issuing HDCP source and sink keys")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Path to the master key file
    #[arg(short, long, value_name = "FILE", default_value = "master-key.txt")]
    master: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("HDCP key service starting");
    tracing::warn!("Requests are not authenticated - anyone who can connect can mint keys");

    let config = ServerConfig { bind_address: args.bind, master_key_path: args.master };
    let server = Server::bind(config).await?;

    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
