use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use periscope_server::ServerConfig;
use tracing_subscriber::EnvFilter;

/// Signaling server for peer-to-peer screen streaming.
///
/// Flags override the corresponding PERISCOPE_* environment variables.
#[derive(Parser)]
#[command(name = "periscope", version)]
struct Cli {
    /// Listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Maximum concurrent rooms.
    #[arg(long)]
    max_rooms: Option<usize>,

    /// Empty-room cleanup grace, in seconds.
    #[arg(long)]
    cleanup_grace: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(max_rooms) = cli.max_rooms {
        config.max_rooms = max_rooms;
    }
    if let Some(secs) = cli.cleanup_grace {
        config.cleanup_grace = Duration::from_secs(secs);
    }

    periscope_server::run(config).await?;
    Ok(())
}
