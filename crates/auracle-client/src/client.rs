//! Resolve-event orchestration.
//!
//! One call runs a fixed sequence:
//!
//! 1. obtain and validate the truth signal (caller value or resolver),
//! 2. derive payer, token account and market state addresses,
//! 3. build with a zero fee and ask the network what that message costs,
//! 4. rebuild with the quoted fee against the same blockhash and submit.
//!
//! Nothing is retried. Collaborator errors surface exactly as returned, and
//! input errors are raised before the first network call.

use std::fmt;
use std::time::Duration;

use auracle_sol::{
    address_to_bytes, bytes_to_address, compile_transaction, serialize_message, Keypair,
    SolTransaction,
};
use tracing::{debug, info, warn};

use crate::accounts::{derive_associated_token_account, derive_market_state};
use crate::codec::{ResolveEventArgs, TruthSignal};
use crate::config::OracleConfig;
use crate::error::OracleError;
use crate::instruction::{build_resolve_event_instruction, ResolveEventAccounts};
use crate::rpc::{JsonRpcClient, RpcNetwork};

/// Produces the truth signal for an event when the caller does not pass one.
pub type TruthSignalResolver = Box<dyn Fn(u64) -> Vec<u8> + Send + Sync>;

/// Read-only settings shared by every call.
pub struct ClientSettings {
    /// Program that owns the market state accounts.
    pub program_id: [u8; 32],
    /// Mint the program charges in; also keys the payer's token account.
    pub mint: [u8; 32],
    /// Consulted only when a call passes no truth signal.
    pub truth_signal_resolver: Option<TruthSignalResolver>,
}

impl ClientSettings {
    /// Parse Base58 program id and mint.
    pub fn new(program_id: &str, mint: &str) -> Result<Self, OracleError> {
        let program_id = address_to_bytes(program_id)
            .map_err(|e| OracleError::Configuration(format!("program id: {e}")))?;
        let mint = address_to_bytes(mint)
            .map_err(|e| OracleError::Configuration(format!("mint: {e}")))?;

        Ok(Self {
            program_id,
            mint,
            truth_signal_resolver: None,
        })
    }

    /// Install the fallback truth-signal source.
    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(u64) -> Vec<u8> + Send + Sync + 'static,
    {
        self.truth_signal_resolver = Some(Box::new(resolver));
        self
    }
}

impl fmt::Debug for ClientSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSettings")
            .field("program_id", &bytes_to_address(&self.program_id))
            .field("mint", &bytes_to_address(&self.mint))
            .field("truth_signal_resolver", &self.truth_signal_resolver.is_some())
            .finish()
    }
}

/// Outcome of a submitted `resolve_event` transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveReceipt {
    pub signature: String,
    pub event_id: u64,
    pub fee_lamports: u64,
}

/// SOL and configured-mint holdings of a wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct WalletBalance {
    pub wallet: String,
    pub lamports: u64,
    pub token_ui_amount: f64,
}

/// Client for the program's `resolve_event` method.
#[derive(Debug)]
pub struct OracleClient<N> {
    settings: ClientSettings,
    network: N,
}

impl OracleClient<JsonRpcClient> {
    /// Client backed by the JSON-RPC endpoint named in `config`.
    pub fn connect(config: &OracleConfig) -> Result<Self, OracleError> {
        config.validate()?;
        let settings = ClientSettings::new(&config.program_id, &config.mint)?;
        let network = JsonRpcClient::new(
            config.rpc_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?;
        Ok(Self::new(settings, network))
    }
}

impl<N: RpcNetwork> OracleClient<N> {
    /// Client over any network collaborator, e.g. a test stub.
    pub fn new(settings: ClientSettings, network: N) -> Self {
        Self { settings, network }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Submit `resolve_event` for `event_id` and return the transaction
    /// signature. Does not wait for confirmation.
    ///
    /// `payer_token_account` is Base58 text; when absent the payer's
    /// associated token account for the configured mint is used.
    pub fn query_truth(
        &self,
        event_id: u64,
        payer: &Keypair,
        payer_token_account: Option<&str>,
        truth_signal: Option<&[u8]>,
    ) -> Result<String, OracleError> {
        self.resolve_event(event_id, payer, payer_token_account, truth_signal)
            .map(|receipt| receipt.signature)
    }

    /// Same flow as [`query_truth`](Self::query_truth), also reporting the
    /// fee that was charged into the instruction.
    pub fn resolve_event(
        &self,
        event_id: u64,
        payer: &Keypair,
        payer_token_account: Option<&str>,
        truth_signal: Option<&[u8]>,
    ) -> Result<ResolveReceipt, OracleError> {
        let truth_signal = self.resolve_signal(event_id, truth_signal)?;

        let payer_pubkey = payer.pubkey();
        let payer_token_account = match payer_token_account {
            Some(text) => address_to_bytes(text)
                .map_err(|e| OracleError::InvalidAddress(format!("payer token account: {e}")))?,
            None => derive_associated_token_account(&payer_pubkey, &self.settings.mint)?,
        };
        let accounts = ResolveEventAccounts {
            payer: payer_pubkey,
            market_state: derive_market_state(event_id, &self.settings.program_id)?,
            payer_token_account,
        };
        debug!(
            event_id,
            payer = %bytes_to_address(&accounts.payer),
            market_state = %bytes_to_address(&accounts.market_state),
            token_account = %bytes_to_address(&accounts.payer_token_account),
            "resolved accounts"
        );

        let draft_args = ResolveEventArgs::new(event_id, truth_signal, 0);
        let blockhash = self.network.get_latest_blockhash()?;
        let draft = self.compile(&accounts, &draft_args, &blockhash)?;
        let message = serialize_message(&draft).map_err(OracleError::Transaction)?;
        let fee_lamports = self.network.get_fee_for_message(&message)?;
        info!(event_id, fee_lamports, "estimated resolve fee");

        let final_tx = self.compile(&accounts, &draft_args.with_fee(fee_lamports), &blockhash)?;
        let signature = self.network.send_transaction(&final_tx, payer)?;
        info!(event_id, %signature, "submitted resolve_event");

        Ok(ResolveReceipt {
            signature,
            event_id,
            fee_lamports,
        })
    }

    /// Lamport balance of `wallet` and its configured-mint token balance.
    /// A failed token lookup (e.g. no token account yet) reads as zero.
    pub fn balance(&self, wallet: &[u8; 32]) -> Result<WalletBalance, OracleError> {
        let token_account = derive_associated_token_account(wallet, &self.settings.mint)?;
        let lamports = self.network.get_balance(wallet)?;
        let token_ui_amount = match self.network.get_token_account_balance(&token_account) {
            Ok(amount) => amount,
            Err(e) => {
                warn!(
                    token_account = %bytes_to_address(&token_account),
                    error = %e,
                    "token balance unavailable"
                );
                0.0
            }
        };

        Ok(WalletBalance {
            wallet: bytes_to_address(wallet),
            lamports,
            token_ui_amount,
        })
    }

    fn resolve_signal(
        &self,
        event_id: u64,
        truth_signal: Option<&[u8]>,
    ) -> Result<TruthSignal, OracleError> {
        match truth_signal {
            Some(bytes) => TruthSignal::try_from(bytes),
            None => {
                let resolver = self.settings.truth_signal_resolver.as_ref().ok_or_else(|| {
                    OracleError::Configuration(
                        "truth signal is required when no resolver is configured".into(),
                    )
                })?;
                TruthSignal::try_from(resolver(event_id))
            }
        }
    }

    fn compile(
        &self,
        accounts: &ResolveEventAccounts,
        args: &ResolveEventArgs,
        blockhash: &[u8; 32],
    ) -> Result<SolTransaction, OracleError> {
        let ix = build_resolve_event_instruction(
            &self.settings.program_id,
            &self.settings.mint,
            accounts,
            args,
        );
        compile_transaction(&[ix], &accounts.payer, blockhash).map_err(OracleError::Transaction)
    }
}
