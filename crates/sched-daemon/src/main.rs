mod core;
mod mpd;

use sched_core::platform;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup file logging
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = platform::log_file();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sched_daemon=debug")),
        )
        .init();

    info!("Log file: {:?}", log_path);
    info!("Config: {:?}", platform::config_path());

    let daemon = core::Daemon::new();
    if let Err(e) = daemon.run().await {
        // Only truly unexpected errors escape the loop; the operator's
        // supervisor is responsible for restarts.
        error!("daemon terminated due to a critical error: {:#}", e);
        return Err(e);
    }
    Ok(())
}
