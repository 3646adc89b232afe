//! Client configuration.
//!
//! The core never reads the environment on its own; [`OracleConfig::from_env`]
//! and [`wallet_from_env`] are opt-in helpers for binaries and scripts.

use std::env;

use auracle_sol::{validate_address, Keypair};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::error::OracleError;

pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_PROGRAM_ID: &str = "PROGRAM_ID";
pub const ENV_MINT: &str = "AURACLE_MINT";
pub const ENV_RPC_TIMEOUT_SECS: &str = "RPC_TIMEOUT_SECS";
pub const ENV_WALLET_SECRET_KEY: &str = "WALLET_SECRET_KEY";

fn default_request_timeout() -> u64 {
    30
}

/// Address parsing is strict; loaders drop surrounding whitespace.
fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|value| value.trim().to_string())
}

/// Endpoint and program addresses for one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OracleConfig {
    /// JSON-RPC endpoint, `http://` or `https://`.
    #[serde(deserialize_with = "trimmed")]
    pub rpc_url: String,
    /// Base58 program id.
    #[serde(deserialize_with = "trimmed")]
    pub program_id: String,
    /// Base58 mint of the token the program charges in.
    #[serde(deserialize_with = "trimmed")]
    pub mint: String,
    /// HTTP timeout for each RPC request. Defaults to 30.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl OracleConfig {
    /// Config with the default timeout. Values are used as given.
    pub fn new(
        rpc_url: impl Into<String>,
        program_id: impl Into<String>,
        mint: impl Into<String>,
    ) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            program_id: program_id.into(),
            mint: mint.into(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Load from the process environment, after merging a `.env` file if one
    /// is present.
    pub fn from_env() -> Result<Self, OracleError> {
        dotenvy::dotenv().ok();

        let request_timeout_secs = match env::var(ENV_RPC_TIMEOUT_SECS) {
            Ok(raw) => raw.trim().parse().map_err(|e| {
                OracleError::Configuration(format!("{ENV_RPC_TIMEOUT_SECS}={raw:?}: {e}"))
            })?,
            Err(_) => default_request_timeout(),
        };

        let config = Self {
            rpc_url: required_var(ENV_RPC_URL)?,
            program_id: required_var(ENV_PROGRAM_ID)?,
            mint: required_var(ENV_MINT)?,
            request_timeout_secs,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check URL scheme, Base58 addresses and a non-zero timeout.
    pub fn validate(&self) -> Result<(), OracleError> {
        if !(self.rpc_url.starts_with("http://") || self.rpc_url.starts_with("https://")) {
            return Err(OracleError::Configuration(format!(
                "rpc_url must be an http(s) URL, got {:?}",
                self.rpc_url
            )));
        }
        validate_address(&self.program_id)
            .map_err(|e| OracleError::Configuration(format!("program_id: {e}")))?;
        validate_address(&self.mint)
            .map_err(|e| OracleError::Configuration(format!("mint: {e}")))?;
        if self.request_timeout_secs == 0 {
            return Err(OracleError::Configuration(
                "request_timeout_secs must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Payer keypair from `WALLET_SECRET_KEY`: a JSON byte array as written by
/// `solana-keygen`, or Base58 text.
pub fn wallet_from_env() -> Result<Keypair, OracleError> {
    dotenvy::dotenv().ok();
    let secret = SecretString::from(required_var(ENV_WALLET_SECRET_KEY)?);
    wallet_from_secret(&secret)
}

/// Parse a payer keypair from secret text: a JSON byte array, or Base58.
pub fn wallet_from_secret(secret: &SecretString) -> Result<Keypair, OracleError> {
    let text = secret.expose_secret().trim();
    let parsed = if text.starts_with('[') {
        Keypair::from_json(text)
    } else {
        Keypair::from_base58(text)
    };
    parsed.map_err(|e| OracleError::Configuration(format!("{ENV_WALLET_SECRET_KEY}: {e}")))
}

fn required_var(name: &str) -> Result<String, OracleError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        _ => Err(OracleError::Configuration(format!("{name} is not set"))),
    }
}
