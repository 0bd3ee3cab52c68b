use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use ties_payments::services::{PaymentService, StripeGateway};
use ties_payments::{build_router, AppState, Config};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Booking payment API", long_about = None)]
struct Cli {
    /// Optional TOML file; environment variables take precedence over it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides PORT / server_port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Sem chave do gateway não há o que servir
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server_port = port;
    }

    info!(
        "Starting payment API on port {} (currency {}, platform fee {} bps)",
        config.server_port, config.payments.currency, config.payments.platform_fee_bps
    );

    let gateway = StripeGateway::new(&config).context("failed to build payment gateway client")?;
    let payment_service = PaymentService::new(Arc::new(gateway), config.payments.clone());
    let app = build_router(AppState::new(payment_service));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
