use std::future::Future;

use futures::StreamExt;
use solana_client::nonblocking::pubsub_client::PubsubClient;
use tracing::info;

use crate::{
    error::{AppError, AppResult},
    ledger::LedgerClient,
    sweep::SlotDispatcher,
};

/// Websocket slot subscription feeding the dispatcher
pub struct SlotFeed {
    ws_url: String,
}

impl SlotFeed {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
        }
    }

    /// Subscribe to slot changes and dispatch them until `shutdown` resolves.
    /// Delivery is best effort: slots skipped by the node are never replayed.
    pub async fn run<L, F>(&self, dispatcher: &SlotDispatcher<L>, shutdown: F) -> AppResult<()>
    where
        L: LedgerClient + 'static,
        F: Future<Output = ()>,
    {
        info!("🔌 Subscribing to slot changes at {}", self.ws_url);

        let pubsub = PubsubClient::new(self.ws_url.as_str())
            .await
            .map_err(|e| AppError::Subscription(format!("connect failed: {}", e)))?;

        let (stream, unsubscribe) = pubsub
            .slot_subscribe()
            .await
            .map_err(|e| AppError::Subscription(format!("slotSubscribe failed: {}", e)))?;

        info!("✅ Subscribed to slot changes");

        let result = dispatcher
            .run(stream.map(|slot_info| slot_info.slot), shutdown)
            .await;

        unsubscribe().await;
        result
    }
}
