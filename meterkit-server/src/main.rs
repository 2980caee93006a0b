// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  meterkit: Prometheus metrics façade over an axum server
//
//  Endpoints: /metrics (text), /jsonmetrics (JSON), /hello (demo)
//  Config:    optional YAML file + METERKIT_ env overrides
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::Parser;
use meterkit_core::AppConfig;
use meterkit_observability::MetricsFacade;
use meterkit_server::server::{build_app, demo_routes, register_demo_metrics, shutdown_signal};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "meterkit", version, about = "Prometheus metrics façade over HTTP")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "meterkit.yaml")]
    config: PathBuf,

    /// Log level, overrides `metrics.log_level`
    #[arg(long)]
    log_level: Option<String>,

    /// Listen address, overrides `server.addr`
    #[arg(long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Config ──
    let config_found = cli.config.exists();
    let mut config = if config_found {
        AppConfig::load(&cli.config)?
    } else {
        AppConfig::default()
    };
    if let Some(level) = cli.log_level {
        config.metrics.log_level = level;
    }
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }
    config.metrics.validate()?;
    let addr = config.server.socket_addr()?;

    // ── Façade (logger + registry + default collector) ──
    let facade = Arc::new(MetricsFacade::configure(&config.metrics)?);
    info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %facade.logger().level(),
        prefix = facade.prefix(),
        "meterkit starting"
    );
    if config_found {
        info!(path = %cli.config.display(), "Loaded config file");
    } else {
        info!("No config file found, using defaults");
    }

    register_demo_metrics(&facade)?;

    // ── HTTP ──
    let app = build_app(Arc::clone(&facade), demo_routes());
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server started on port {}", listener.local_addr()?.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutdown signal received, stopping...");
    facade.stop_default_metrics().await;
    info!("meterkit stopped");
    Ok(())
}
