//! Solana primitives for the Auracle resolve-event SDK.
//!
//! Address encoding, program-derived address search, associated token
//! accounts, payer keypairs and the legacy message wire format, all written
//! by hand on top of `ed25519-dalek`, `curve25519-dalek`, `sha2` and `bs58`.
//! Nothing here talks to the network.

pub mod address;
pub mod error;
pub mod keypair;
pub mod pda;
pub mod spl_token;
pub mod transaction;

pub use address::{address_to_bytes, bytes_to_address, validate_address};
pub use error::SolError;
pub use keypair::Keypair;
pub use pda::{create_program_address, find_program_address, is_on_curve};
pub use spl_token::{
    derive_associated_token_address, ASSOCIATED_TOKEN_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
pub use transaction::{
    compile_transaction, encode_compact_u16, serialize_message, sign_transaction,
    CompiledInstruction, SignedTransaction, SolAccountMeta, SolInstruction, SolTransaction,
    SYSTEM_PROGRAM_ID,
};
