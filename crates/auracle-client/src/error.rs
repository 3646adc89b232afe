use auracle_sol::SolError;
use thiserror::Error;

use crate::rpc::NetworkError;

/// Everything a resolve-event call can fail with.
#[derive(Debug, Error)]
pub enum OracleError {
    /// Missing or unusable configuration: no resolver for an omitted truth
    /// signal, bad program id or mint, missing environment variables.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Caller input rejected before any network access.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address derivation failed: {0}")]
    AddressDerivation(#[source] SolError),

    #[error("Transaction build failed: {0}")]
    Transaction(#[source] SolError),

    /// Collaborator failures pass through untouched.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
