pub mod rpc;
pub mod slot_feed;

pub use rpc::RpcLedgerClient;
pub use slot_feed::SlotFeed;

use async_trait::async_trait;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};

use crate::error::LedgerError;

/// A recent blockhash together with the fee charged per signature while it
/// is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeReference {
    pub blockhash: Hash,
    pub lamports_per_signature: u64,
}

/// Ledger client - the network operations the sweep agent depends on
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Balance of an account in lamports
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError>;

    /// Latest blockhash and its per-signature fee
    async fn get_recent_fee_reference(&self) -> Result<FeeReference, LedgerError>;

    /// Sign `transaction` with `signer` against the blockhash stamped on its
    /// message and submit it. Returns once the cluster accepts it; nothing
    /// waits for confirmation.
    async fn submit_transfer(
        &self,
        transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, LedgerError>;
}
