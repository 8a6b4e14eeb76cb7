use std::str::FromStr;

use solana_commitment_config::CommitmentConfig;

use crate::error::{AppError, AppResult};

const REQUIRED_KEYS: [&str; 3] = ["KEY_PAIR_PATH", "SOLANA_CLUSTER_URL", "DESTINATION_ADDRESS"];

#[derive(Debug, Clone)]
pub struct Config {
    pub key_pair_path: String,
    pub cluster_url: String,
    pub ws_url: String,
    pub destination_address: String,
    pub commitment: CommitmentConfig,
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::Environment::default())
            .build()?;

        Self::from_settings(&settings)
    }

    /// Builds the configuration from already-collected settings.
    ///
    /// Keys are looked up lowercased, which is how the `config` crate stores
    /// environment variables. Every missing required key is reported at once.
    pub fn from_settings(settings: &::config::Config) -> AppResult<Self> {
        let lookup = |key: &str| {
            settings
                .get_string(&key.to_lowercase())
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| lookup(key).is_none())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        let key_pair_path = lookup("KEY_PAIR_PATH").unwrap_or_default();
        let cluster_url = lookup("SOLANA_CLUSTER_URL").unwrap_or_default();
        let destination_address = lookup("DESTINATION_ADDRESS").unwrap_or_default();

        let ws_url = match lookup("SOLANA_WS_URL") {
            Some(url) => url,
            None => websocket_url(&cluster_url)?,
        };

        let commitment = match lookup("SOLANA_COMMITMENT") {
            Some(level) => CommitmentConfig::from_str(&level).map_err(|_| {
                AppError::Config(format!(
                    "SOLANA_COMMITMENT must be processed, confirmed or finalized, got {}",
                    level
                ))
            })?,
            None => CommitmentConfig::finalized(),
        };

        Ok(Self {
            key_pair_path,
            cluster_url,
            ws_url,
            destination_address,
            commitment,
        })
    }
}

/// Derives the pubsub endpoint from an HTTP RPC endpoint. An explicit port
/// is bumped by one, matching where solana-test-validator serves pubsub.
fn websocket_url(cluster_url: &str) -> AppResult<String> {
    let (scheme, rest) = if let Some(rest) = cluster_url.strip_prefix("https://") {
        ("wss", rest)
    } else if let Some(rest) = cluster_url.strip_prefix("http://") {
        ("ws", rest)
    } else {
        return Err(AppError::Config(format!(
            "SOLANA_CLUSTER_URL must start with http:// or https://, got {}",
            cluster_url
        )));
    };

    let (authority, path) = match rest.find(|c: char| c == '/' || c == '?') {
        Some(index) => rest.split_at(index),
        None => (rest, ""),
    };

    let authority = match authority.rsplit_once(':') {
        // a trailing `]` means the colon belongs to a bracketed IPv6 host
        Some((host, port)) if !port.ends_with(']') => {
            let port = port
                .parse::<u16>()
                .ok()
                .and_then(|port| port.checked_add(1))
                .ok_or_else(|| {
                    AppError::Config(format!(
                        "SOLANA_CLUSTER_URL has an invalid port: {}",
                        cluster_url
                    ))
                })?;
            format!("{}:{}", host, port)
        }
        _ => authority.to_string(),
    };

    Ok(format!("{}://{}{}", scheme, authority, path))
}
