use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_commitment_config::CommitmentConfig;
use solana_sdk::{
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use tracing::debug;

use crate::{
    error::LedgerError,
    ledger::{FeeReference, LedgerClient},
};

/// JSON-RPC backed ledger client
pub struct RpcLedgerClient {
    client: RpcClient,
    fee_payer: Pubkey,
}

impl RpcLedgerClient {
    /// `fee_payer` is the account whose one-signature messages are priced
    /// when querying the fee reference.
    pub fn new(rpc_url: String, commitment: CommitmentConfig, fee_payer: Pubkey) -> Self {
        let client = RpcClient::new_with_commitment(rpc_url, commitment);

        Self { client, fee_payer }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, LedgerError> {
        self.client
            .get_balance(address)
            .await
            .map_err(|e| LedgerError::rpc("getBalance", e))
    }

    async fn get_recent_fee_reference(&self) -> Result<FeeReference, LedgerError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| LedgerError::rpc("getLatestBlockhash", e))?;

        // A message with no instructions carries exactly one signature: the
        // fee payer's.
        let message = Message::new_with_blockhash(&[], Some(&self.fee_payer), &blockhash);
        let lamports_per_signature = self
            .client
            .get_fee_for_message(&message)
            .await
            .map_err(|e| LedgerError::rpc("getFeeForMessage", e))?;

        debug!(%blockhash, lamports_per_signature, "fetched fee reference");

        Ok(FeeReference {
            blockhash,
            lamports_per_signature,
        })
    }

    async fn submit_transfer(
        &self,
        mut transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, LedgerError> {
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[signer], blockhash)
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        self.client
            .send_transaction(&transaction)
            .await
            .map_err(|e| LedgerError::rpc("sendTransaction", e))
    }
}
