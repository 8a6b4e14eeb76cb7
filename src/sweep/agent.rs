// Sweep Agent
//
// Per slot notification:
// 1. Skip if another attempt holds the guard
// 2. Fetch balance and the recent blockhash with its fee
// 3. Skip if the blockhash was already used by an earlier attempt
// 4. Skip if the balance does not cover the fee
// 5. Transfer balance - fee to the destination, fee paid by the source

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use solana_sdk::{
    hash::Hash,
    message::Message,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::Transaction,
};
use solana_system_interface::instruction as system_instruction;
use tracing::{info, instrument, warn};

use crate::{error::SweepError, ledger::LedgerClient};

const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Outcome of a submitted sweep
#[derive(Debug, Clone)]
pub struct SweepReceipt {
    pub slot: u64,
    pub signature: Signature,
    pub amount: u64,
    pub fee: u64,
    pub destination: Pubkey,
    pub submitted_at: DateTime<Utc>,
}

/// Releases the execution guard when dropped, whichever way the attempt ends.
struct SweepGuard<'a> {
    in_progress: &'a AtomicBool,
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.in_progress.store(false, Ordering::Release);
    }
}

pub struct SweepAgent<L> {
    ledger: Arc<L>,
    wallet: Arc<Keypair>,
    destination: Pubkey,
    in_progress: AtomicBool,
    last_blockhash: Mutex<Option<Hash>>,
}

impl<L: LedgerClient> SweepAgent<L> {
    pub fn new(ledger: Arc<L>, wallet: Arc<Keypair>, destination: Pubkey) -> Self {
        Self {
            ledger,
            wallet,
            destination,
            in_progress: AtomicBool::new(false),
            last_blockhash: Mutex::new(None),
        }
    }

    pub fn source(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    pub fn destination(&self) -> Pubkey {
        self.destination
    }

    #[cfg(test)]
    pub fn is_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Blockhash seen by the most recent attempt that got past the busy check
    #[cfg(test)]
    pub fn last_blockhash(&self) -> Option<Hash> {
        *self.last_blockhash.lock()
    }

    fn try_acquire(&self) -> Option<SweepGuard<'_>> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SweepGuard {
                in_progress: &self.in_progress,
            })
    }

    fn observe_blockhash(&self, blockhash: Hash) -> Result<(), SweepError> {
        let mut last = self.last_blockhash.lock();
        if *last == Some(blockhash) {
            return Err(SweepError::DuplicateReference(blockhash));
        }
        *last = Some(blockhash);
        Ok(())
    }

    /// Single system transfer from the source wallet, which also pays the fee.
    pub fn build_transfer(&self, lamports: u64, blockhash: Hash) -> Transaction {
        let source = self.wallet.pubkey();
        let instruction = system_instruction::transfer(&source, &self.destination, lamports);
        let message = Message::new_with_blockhash(&[instruction], Some(&source), &blockhash);

        Transaction::new_unsigned(message)
    }

    /// Run one sweep attempt. Never runs concurrently with another attempt
    /// on the same agent.
    pub async fn sweep(&self, slot: u64) -> Result<SweepReceipt, SweepError> {
        let _guard = self.try_acquire().ok_or(SweepError::Busy)?;

        info!("Starting transfer.");

        let source = self.wallet.pubkey();
        let balance = self.ledger.get_balance(&source).await?;
        let reference = self.ledger.get_recent_fee_reference().await?;

        self.observe_blockhash(reference.blockhash)?;

        let fee = reference.lamports_per_signature;
        info!("Balance: {} lamports ({} SOL)", balance, lamports_to_sol(balance));
        info!("Recent blockhash: {}", reference.blockhash);
        info!("Cost: {} lamports", fee);

        if balance <= fee {
            return Err(SweepError::InsufficientBalance { balance, fee });
        }

        let amount = balance - fee;
        info!(
            "Sending {} lamports ({} SOL) to {}",
            amount,
            lamports_to_sol(amount),
            self.destination
        );

        let transaction = self.build_transfer(amount, reference.blockhash);
        let signature = self
            .ledger
            .submit_transfer(transaction, &self.wallet)
            .await?;

        Ok(SweepReceipt {
            slot,
            signature,
            amount,
            fee,
            destination: self.destination,
            submitted_at: Utc::now(),
        })
    }

    /// Slot notification entry point: runs an attempt and reports how it ended.
    #[instrument(skip(self))]
    pub async fn handle_slot(&self, slot: u64) -> Result<SweepReceipt, SweepError> {
        let result = self.sweep(slot).await;

        match &result {
            Ok(receipt) => info!(
                slot = receipt.slot,
                submitted_at = %receipt.submitted_at,
                "✅ Sent {} lamports to {} with txId {} (fee {} lamports)",
                receipt.amount,
                receipt.destination,
                receipt.signature,
                receipt.fee
            ),
            Err(e) => warn!(kind = e.kind(), "{}", e),
        }

        result
    }
}

pub fn lamports_to_sol(lamports: u64) -> Decimal {
    Decimal::from(lamports) / Decimal::from(LAMPORTS_PER_SOL)
}
