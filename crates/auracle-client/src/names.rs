//! Addressing events by a human-readable name instead of a numeric id.

use auracle_sol::Keypair;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::OracleClient;
use crate::error::OracleError;
use crate::rpc::RpcNetwork;

/// Event id for `name`: the first 8 bytes of `sha256(name)`, little-endian.
///
/// Distinct names can collide in 64 bits; callers that need uniqueness
/// should register ids on the program side.
pub fn event_id_for(name: &str) -> u64 {
    let digest = Sha256::digest(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(head)
}

/// Name-keyed front end over an [`OracleClient`].
#[derive(Debug)]
pub struct NaturalLanguageOracle<'a, N> {
    client: &'a OracleClient<N>,
}

impl<'a, N: RpcNetwork> NaturalLanguageOracle<'a, N> {
    pub fn new(client: &'a OracleClient<N>) -> Self {
        Self { client }
    }

    /// Resolve the event named `name`. Same contract as
    /// [`OracleClient::query_truth`].
    pub fn verify_by_name(
        &self,
        name: &str,
        payer: &Keypair,
        payer_token_account: Option<&str>,
        truth_signal: Option<&[u8]>,
    ) -> Result<String, OracleError> {
        let event_id = event_id_for(name);
        debug!(name, event_id, "event id from name");
        self.client
            .query_truth(event_id, payer, payer_token_account, truth_signal)
    }
}
