//! Client SDK for the Auracle oracle program on Solana.
//!
//! Builds, fee-estimates and submits `resolve_event` transactions. The
//! on-chain program is not part of this crate; the layouts below must match
//! what it expects byte for byte.

pub mod accounts;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod instruction;
pub mod names;
pub mod rpc;

pub use accounts::{derive_associated_token_account, derive_market_state, MARKET_SEED};
pub use client::{ClientSettings, OracleClient, ResolveReceipt, TruthSignalResolver, WalletBalance};
pub use codec::{
    encode_resolve_event, instruction_discriminator, ResolveEventArgs, TruthSignal,
    RESOLVE_EVENT_DISCRIMINATOR,
};
pub use config::{wallet_from_env, wallet_from_secret, OracleConfig};
pub use error::OracleError;
pub use instruction::{build_resolve_event_instruction, ResolveEventAccounts};
pub use names::{event_id_for, NaturalLanguageOracle};
pub use rpc::{JsonRpcClient, NetworkError, RpcNetwork};

pub use auracle_sol::Keypair;
