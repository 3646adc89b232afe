//! Addresses the `resolve_event` instruction touches.

use auracle_sol::{derive_associated_token_address, find_program_address};

use crate::error::OracleError;

/// Seed tag of the per-event market state account.
pub const MARKET_SEED: &[u8] = b"market";

/// Market state PDA for `event_id`: seeds `[b"market", le_u64(event_id)]`.
pub fn derive_market_state(
    event_id: u64,
    program_id: &[u8; 32],
) -> Result<[u8; 32], OracleError> {
    market_state_with_bump(event_id, program_id).map(|(address, _)| address)
}

/// Market state PDA together with its canonical bump.
pub fn market_state_with_bump(
    event_id: u64,
    program_id: &[u8; 32],
) -> Result<([u8; 32], u8), OracleError> {
    find_program_address(&[MARKET_SEED, &event_id.to_le_bytes()], program_id)
        .map_err(OracleError::AddressDerivation)
}

/// The owner's associated token account for `mint`.
pub fn derive_associated_token_account(
    owner: &[u8; 32],
    mint: &[u8; 32],
) -> Result<[u8; 32], OracleError> {
    derive_associated_token_address(owner, mint).map_err(OracleError::AddressDerivation)
}
