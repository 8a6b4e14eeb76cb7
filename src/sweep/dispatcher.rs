use std::{future::Future, sync::Arc};

use futures::{Stream, StreamExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info};

use crate::{
    error::{AppError, AppResult},
    ledger::LedgerClient,
    sweep::SweepAgent,
};

/// Fans slot notifications out to the sweep agent.
///
/// Every notification gets its own task so a running sweep never holds up
/// the subscription; notifications that arrive mid-sweep hit the agent's
/// guard and are dropped instead of queueing.
pub struct SlotDispatcher<L> {
    agent: Arc<SweepAgent<L>>,
}

impl<L: LedgerClient + 'static> SlotDispatcher<L> {
    pub fn new(agent: Arc<SweepAgent<L>>) -> Self {
        Self { agent }
    }

    /// Consume `slots` until `shutdown` resolves or the stream ends, then wait
    /// for the in-flight attempt to finish.
    pub async fn run<S, F>(&self, mut slots: S, shutdown: F) -> AppResult<()>
    where
        S: Stream<Item = u64> + Unpin,
        F: Future<Output = ()>,
    {
        let mut in_flight = JoinSet::new();
        tokio::pin!(shutdown);

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("🛑 Shutdown requested, no longer accepting slot changes");
                    break Ok(());
                }
                next = slots.next() => match next {
                    Some(slot) => {
                        debug!(slot, "slot changed");
                        let agent = self.agent.clone();
                        in_flight.spawn(async move {
                            // outcome is already reported by the agent
                            let _ = agent.handle_slot(slot).await;
                        });
                    }
                    None => {
                        break Err(AppError::Subscription(
                            "slot notification stream closed".to_string(),
                        ));
                    }
                },
            }

            while let Some(joined) = in_flight.try_join_next() {
                log_join_failure(joined);
            }
        };

        if !in_flight.is_empty() {
            info!("Waiting for in-flight transfer to finish");
        }
        while let Some(joined) = in_flight.join_next().await {
            log_join_failure(joined);
        }

        result
    }
}

fn log_join_failure(joined: Result<(), JoinError>) {
    if let Err(e) = joined {
        error!("❌ Sweep task failed: {}", e);
    }
}
