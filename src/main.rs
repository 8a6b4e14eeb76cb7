mod bootstrap;
mod config;
mod error;
mod ledger;
mod sweep;
mod wallet;

#[cfg(test)]
mod test_helpers;

use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{config::Config, ledger::SlotFeed, sweep::SlotDispatcher};

// Initialize logging and tracing
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,sweeper=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    info!("🚀 Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };

    let agent = bootstrap::initialize_agent(&config).await?;
    let dispatcher = SlotDispatcher::new(agent);

    SlotFeed::new(config.ws_url.clone())
        .run(&dispatcher, shutdown_signal())
        .await?;

    info!("👋 Sweeper stopped");

    Ok(())
}
