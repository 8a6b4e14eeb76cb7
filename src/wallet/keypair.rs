use std::{path::Path, str::FromStr};

use solana_sdk::{pubkey::Pubkey, signature::Keypair};

use crate::error::{AppError, AppResult};

/// Load a keypair stored in the Solana CLI format: a JSON array of the
/// 64 secret key bytes.
pub async fn load_keypair(path: impl AsRef<Path>) -> AppResult<Keypair> {
    let path = path.as_ref();
    let keypair_error = |message: String| AppError::Keypair {
        path: path.display().to_string(),
        message,
    };

    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| keypair_error(format!("unable to read file: {}", e)))?;

    let bytes: Vec<u8> = serde_json::from_str(&contents)
        .map_err(|e| keypair_error(format!("expected a JSON array of bytes: {}", e)))?;

    if bytes.len() != 64 {
        return Err(keypair_error(format!(
            "expected 64 secret key bytes, found {}",
            bytes.len()
        )));
    }

    Keypair::try_from(bytes.as_slice()).map_err(|e| keypair_error(e.to_string()))
}

pub fn parse_destination(address: &str) -> AppResult<Pubkey> {
    Pubkey::from_str(address.trim())
        .map_err(|e| AppError::InvalidAddress(format!("{}: {}", address, e)))
}
