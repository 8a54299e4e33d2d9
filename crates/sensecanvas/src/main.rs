//! SenseCanvas - Entry Point

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// SenseCanvas hardware-monitoring dashboard backend
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via SENSECANVAS_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    sensecanvas_telemetry::init_logging()?;

    info!("Starting SenseCanvas v{}", env!("CARGO_PKG_VERSION"));

    // CLI arg > SENSECANVAS_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("SENSECANVAS_CONFIG").ok())
        .unwrap_or_else(|| sensecanvas::config::DEFAULT_CONFIG_PATH.to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = sensecanvas::AppConfig::load(&config_path)?;
    info!(
        mode = ?config.stream.mode,
        url = %config.stream.url,
        dashboard_port = config.dashboard.port,
        "Configuration loaded"
    );

    let app = sensecanvas::Application::new(config)?;
    app.run().await?;

    Ok(())
}
