use solana_sdk::hash::Hash;
use thiserror::Error;

/// Top-level error type for startup and the slot feed
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load keypair from {path}: {message}")]
    Keypair { path: String, message: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Slot subscription error: {0}")]
    Subscription(String),
}

/// Failures reported by the ledger client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("{operation} failed: {message}")]
    Rpc {
        operation: &'static str,
        message: String,
    },

    #[error("Signing failed: {0}")]
    Signing(String),
}

impl LedgerError {
    pub fn rpc(operation: &'static str, err: impl std::fmt::Display) -> Self {
        LedgerError::Rpc {
            operation,
            message: err.to_string(),
        }
    }
}

/// Why a single sweep attempt did not submit a transfer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    #[error("Transfer already in progress. Skipping this slot change.")]
    Busy,

    #[error("Got same last blockhash, skipping: {0}")]
    DuplicateReference(Hash),

    #[error("Not enough lamports to send a transaction. Balance: {balance}, fee: {fee}")]
    InsufficientBalance { balance: u64, fee: u64 },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl SweepError {
    pub fn kind(&self) -> &'static str {
        match self {
            SweepError::Busy => "busy",
            SweepError::DuplicateReference(_) => "duplicate_reference",
            SweepError::InsufficientBalance { .. } => "insufficient_balance",
            SweepError::Ledger(_) => "transport",
        }
    }
}

impl From<::config::ConfigError> for AppError {
    fn from(error: ::config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
