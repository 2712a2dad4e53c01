//! Rover Gateway binary.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                ROVER GATEWAY                  │
//!   Client Request     │  ┌────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ───────────────────┼─▶│  http  │──▶│ routing │──▶│ proxy engine│  │
//!                      │  │ server │   │  table  │   │ /stream     │  │
//!                      │  └────────┘   └─────────┘   │   relay     │  │
//!                      │                             └──────┬──────┘  │
//!                      │        ┌──────────┐                │         │
//!   Client Response    │        │ upstream │◀───────────────┘         │
//!   ◀──────────────────┼────────│ registry │── controller / camera ───┼──▶ devices
//!                      │        └──────────┘                          │
//!                      │  config · lifecycle · tracing                │
//!                      └──────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rover_gateway::config::{self, GatewayConfig};
use rover_gateway::{GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "rover-gateway")]
#[command(about = "HTTP gateway for the rover controller and camera", long_about = None)]
struct Cli {
    /// Path to a TOML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller address (host[:port]), overrides the config file.
    #[arg(long)]
    controller: Option<String>,

    /// Camera address (host[:port]), overrides the config file.
    #[arg(long)]
    camera: Option<String>,

    /// Listen port, overrides the config file's bind address port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory of static dashboard assets, overrides the config file.
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rover_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("rover-gateway v0.1.0 starting");

    let cli = Cli::parse();

    // File config (or defaults), then CLI overrides, then validation. The
    // loader validates too, but overrides may invalidate a valid file.
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GatewayConfig::default(),
    };
    apply_overrides(&mut config, &cli)?;
    config::validate_config(&config).map_err(|errors| {
        errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    })?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        controller = %config.upstreams.controller,
        camera = %config.upstreams.camera,
        connect_timeout_secs = config.timeouts.connect_secs,
        idle_timeout_secs = config.timeouts.idle_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Fold CLI flags into the loaded configuration.
fn apply_overrides(config: &mut GatewayConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(controller) = &cli.controller {
        config.upstreams.controller = controller.clone();
    }
    if let Some(camera) = &cli.camera {
        config.upstreams.camera = camera.clone();
    }
    if let Some(port) = cli.port {
        let mut addr: std::net::SocketAddr = config.listener.bind_address.parse()?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }
    if let Some(static_dir) = &cli.static_dir {
        config.static_dir = Some(static_dir.clone());
    }
    Ok(())
}
