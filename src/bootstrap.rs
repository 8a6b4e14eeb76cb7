use std::sync::Arc;

use solana_sdk::signature::Signer;
use tracing::info;

use crate::{
    config::Config,
    error::AppResult,
    ledger::RpcLedgerClient,
    sweep::SweepAgent,
    wallet::{load_keypair, parse_destination},
};

/// Load credentials, connect to the cluster and build the sweep agent.
pub async fn initialize_agent(config: &Config) -> AppResult<Arc<SweepAgent<RpcLedgerClient>>> {
    let destination = parse_destination(&config.destination_address)?;

    info!("Loading keypair...");
    let wallet = Arc::new(load_keypair(&config.key_pair_path).await?);
    info!("Keypair loaded: {}", wallet.pubkey());

    info!("Connecting to cluster...");
    let ledger = Arc::new(RpcLedgerClient::new(
        config.cluster_url.clone(),
        config.commitment,
        wallet.pubkey(),
    ));
    info!(
        "Connected to cluster {} ({:?} commitment)",
        ledger.url(),
        config.commitment.commitment
    );

    let agent = SweepAgent::new(ledger, wallet, destination);
    info!("🎯 Sweeping {} → {}", agent.source(), agent.destination());

    Ok(Arc::new(agent))
}
