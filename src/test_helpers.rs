//! Scripted in-memory ledger client for exercising the sweep agent.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::Transaction,
};
use tokio::sync::Notify;

use crate::{
    error::LedgerError,
    ledger::{FeeReference, LedgerClient},
};

pub fn blockhash(byte: u8) -> Hash {
    Hash::new_from_array([byte; 32])
}

struct MockState {
    balance: u64,
    fee_reference: FeeReference,
    balance_failure: Option<LedgerError>,
    fee_failure: Option<LedgerError>,
    submit_failure: Option<LedgerError>,
    submitted: Vec<Transaction>,
}

pub struct MockLedger {
    state: Mutex<MockState>,
    balance_calls: AtomicUsize,
    fee_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    balance_requested: Notify,
    gate: Option<Notify>,
}

impl MockLedger {
    pub fn new(balance: u64, blockhash: Hash, lamports_per_signature: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                balance,
                fee_reference: FeeReference {
                    blockhash,
                    lamports_per_signature,
                },
                balance_failure: None,
                fee_failure: None,
                submit_failure: None,
                submitted: Vec::new(),
            }),
            balance_calls: AtomicUsize::new(0),
            fee_calls: AtomicUsize::new(0),
            submit_calls: AtomicUsize::new(0),
            balance_requested: Notify::new(),
            gate: None,
        }
    }

    /// Balance queries block until `release` is called, once per query.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    /// Resolves once a balance query has started.
    pub async fn balance_requested(&self) {
        self.balance_requested.notified().await;
    }

    pub fn set_balance(&self, balance: u64) {
        self.state.lock().balance = balance;
    }

    pub fn set_blockhash(&self, blockhash: Hash) {
        self.state.lock().fee_reference.blockhash = blockhash;
    }

    pub fn fail_balance(&self, error: Option<LedgerError>) {
        self.state.lock().balance_failure = error;
    }

    pub fn fail_fee(&self, error: Option<LedgerError>) {
        self.state.lock().fee_failure = error;
    }

    pub fn fail_submit(&self, error: Option<LedgerError>) {
        self.state.lock().submit_failure = error;
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn fee_calls(&self) -> usize {
        self.fee_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.balance_calls() + self.fee_calls() + self.submit_calls()
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.state.lock().submitted.clone()
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    async fn get_balance(&self, _address: &Pubkey) -> Result<u64, LedgerError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balance_requested.notify_one();
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let state = self.state.lock();
        match &state.balance_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.balance),
        }
    }

    async fn get_recent_fee_reference(&self) -> Result<FeeReference, LedgerError> {
        self.fee_calls.fetch_add(1, Ordering::SeqCst);

        let state = self.state.lock();
        match &state.fee_failure {
            Some(error) => Err(error.clone()),
            None => Ok(state.fee_reference),
        }
    }

    async fn submit_transfer(
        &self,
        mut transaction: Transaction,
        signer: &Keypair,
    ) -> Result<Signature, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);

        let mut state = self.state.lock();
        if let Some(error) = &state.submit_failure {
            return Err(error.clone());
        }

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[signer], blockhash)
            .map_err(|e| LedgerError::Signing(e.to_string()))?;

        let signature = transaction.signatures[0];
        state.submitted.push(transaction);
        Ok(signature)
    }
}

/// Convenience for wiring an agent against a mock in tests.
pub fn mock_agent(
    ledger: Arc<MockLedger>,
) -> (crate::sweep::SweepAgent<MockLedger>, Pubkey) {
    use solana_sdk::signature::Signer;

    let destination = Keypair::new().pubkey();
    let agent = crate::sweep::SweepAgent::new(ledger, Arc::new(Keypair::new()), destination);
    (agent, destination)
}

/// In-memory sink for formatted log lines, installed as the thread's default
/// subscriber for the lifetime of the returned guard.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(level))
            .map(str::to_string)
            .collect()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
