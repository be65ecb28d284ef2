//! bitmesh script runner.
//!
//! # Usage
//!
//! ```bash
//! # Replay a session as peer "self" on the mesh channel
//! bitmesh session.txt --local-peer self
//!
//! # Start on a location channel with verbose logging
//! bitmesh session.txt --local-peer self --channel 9q8yy --log-level debug
//! ```

use std::path::PathBuf;

use bitmesh_app::{AppConfig, Runtime};
use bitmesh_cli::ScriptDriver;
use bitmesh_core::ChannelId;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// bitmesh presence core script runner
#[derive(Parser, Debug)]
#[command(name = "bitmesh")]
#[command(about = "Replay scripted mesh-chat events through the bitmesh presence core")]
#[command(version)]
struct Args {
    /// Path to the event script
    script: PathBuf,

    /// Our own peer id (excluded from mesh counts)
    #[arg(long)]
    local_peer: String,

    /// Channel selected at startup: mesh or a geohash
    #[arg(long)]
    channel: Option<ChannelId>,

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

    let mut config = AppConfig::new(args.local_peer);
    if let Some(channel) = args.channel {
        config = config.with_initial_channel(channel);
    }

    tracing::info!(
        script = %args.script.display(),
        local_peer = %config.local_peer,
        "replaying script"
    );
    let driver = ScriptDriver::open(&args.script).await?;

    let mut runtime = Runtime::new(driver, config);
    runtime.run().await?;

    let app = runtime.app();
    tracing::info!(
        renders = runtime.driver().render_count(),
        groups = app.registry().len(),
        unread = app.unread().snapshot().total(),
        "script finished"
    );

    Ok(())
}
