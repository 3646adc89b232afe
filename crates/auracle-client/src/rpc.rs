//! Network collaborator: the handful of Solana RPC calls the SDK needs.
//!
//! [`RpcNetwork`] is the seam the orchestrator talks to. [`JsonRpcClient`]
//! is the stock implementation over HTTP JSON-RPC 2.0. It is blocking, so
//! do not construct or drop it from inside an async runtime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use auracle_sol::{
    bytes_to_address, sign_transaction, Keypair, SignedTransaction, SolTransaction,
};
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Commitment used for every read and as the preflight level.
pub const COMMITMENT: &str = "confirmed";

/// Failures reported by a network collaborator.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    /// JSON-RPC error object. `data` carries details such as preflight
    /// simulation logs when the node supplies them.
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<Value>,
    },

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),

    /// `getFeeForMessage` returned `null`, usually because the blockhash in
    /// the message is unknown to the node.
    #[error("Fee unavailable for message")]
    FeeUnavailable,

    #[error("Signing failed: {0}")]
    Signing(String),
}

/// Synchronous view of the ledger used by the resolve flow.
pub trait RpcNetwork {
    /// Most recent blockhash at `confirmed` commitment.
    fn get_latest_blockhash(&self) -> Result<[u8; 32], NetworkError>;

    /// Fee in lamports for a serialized legacy message.
    fn get_fee_for_message(&self, message: &[u8]) -> Result<u64, NetworkError>;

    /// Sign `tx` with `signer` and submit it. Returns the Base58 signature
    /// without waiting for confirmation.
    fn send_transaction(
        &self,
        tx: &SolTransaction,
        signer: &Keypair,
    ) -> Result<String, NetworkError>;

    /// Lamports held by `address`.
    fn get_balance(&self, address: &[u8; 32]) -> Result<u64, NetworkError>;

    /// UI amount (decimals applied) held by a token account.
    fn get_token_account_balance(&self, address: &[u8; 32]) -> Result<f64, NetworkError>;
}

impl<T: RpcNetwork + ?Sized> RpcNetwork for &T {
    fn get_latest_blockhash(&self) -> Result<[u8; 32], NetworkError> {
        (**self).get_latest_blockhash()
    }

    fn get_fee_for_message(&self, message: &[u8]) -> Result<u64, NetworkError> {
        (**self).get_fee_for_message(message)
    }

    fn send_transaction(
        &self,
        tx: &SolTransaction,
        signer: &Keypair,
    ) -> Result<String, NetworkError> {
        (**self).send_transaction(tx, signer)
    }

    fn get_balance(&self, address: &[u8; 32]) -> Result<u64, NetworkError> {
        (**self).get_balance(address)
    }

    fn get_token_account_balance(&self, address: &[u8; 32]) -> Result<f64, NetworkError> {
        (**self).get_token_account_balance(address)
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct BlockhashValue {
    blockhash: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAmount {
    ui_amount: Option<f64>,
}

// ---------------------------------------------------------------------------
// HTTP transport
// ---------------------------------------------------------------------------

/// Blocking JSON-RPC client for a single Solana endpoint.
#[derive(Debug)]
pub struct JsonRpcClient {
    url: String,
    http: reqwest::blocking::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Client for `url`; `timeout` bounds each request end to end.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NetworkError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http,
            next_id: AtomicU64::new(1),
        })
    }

    fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, NetworkError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = request_body(id, method, params);
        debug!(method, id, endpoint = %self.url, "rpc request");

        let resp = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| NetworkError::Transport(format!("{method}: {e}")))?;
        if !status.is_success() {
            return Err(http_error(method, status.as_u16(), &text));
        }

        let body: RpcResponse<T> = serde_json::from_str(&text)
            .map_err(|e| NetworkError::InvalidResponse(format!("{method}: {e}")))?;
        into_result(method, body)
    }
}

impl RpcNetwork for JsonRpcClient {
    fn get_latest_blockhash(&self) -> Result<[u8; 32], NetworkError> {
        let resp: WithContext<BlockhashValue> =
            self.call("getLatestBlockhash", json!([{ "commitment": COMMITMENT }]))?;
        decode_blockhash(&resp.value.blockhash)
    }

    fn get_fee_for_message(&self, message: &[u8]) -> Result<u64, NetworkError> {
        let resp: WithContext<Option<u64>> = self.call(
            "getFeeForMessage",
            json!([BASE64_STANDARD.encode(message), { "commitment": COMMITMENT }]),
        )?;
        resp.value.ok_or(NetworkError::FeeUnavailable)
    }

    fn send_transaction(
        &self,
        tx: &SolTransaction,
        signer: &Keypair,
    ) -> Result<String, NetworkError> {
        let signed =
            sign_transaction(tx, signer).map_err(|e| NetworkError::Signing(e.to_string()))?;
        let returned: String = self.call(
            "sendTransaction",
            json!([
                BASE64_STANDARD.encode(&signed.wire),
                { "encoding": "base64", "preflightCommitment": COMMITMENT }
            ]),
        )?;
        check_signature(returned, &signed)
    }

    fn get_balance(&self, address: &[u8; 32]) -> Result<u64, NetworkError> {
        let resp: WithContext<u64> = self.call(
            "getBalance",
            json!([bytes_to_address(address), { "commitment": COMMITMENT }]),
        )?;
        Ok(resp.value)
    }

    fn get_token_account_balance(&self, address: &[u8; 32]) -> Result<f64, NetworkError> {
        let resp: WithContext<TokenAmount> = self.call(
            "getTokenAccountBalance",
            json!([bytes_to_address(address), { "commitment": COMMITMENT }]),
        )?;
        Ok(resp.value.ui_amount.unwrap_or(0.0))
    }
}

fn request_body(id: u64, method: &str, params: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": method,
        "params": params,
    })
}

fn into_result<T>(method: &str, body: RpcResponse<T>) -> Result<T, NetworkError> {
    if let Some(err) = body.error {
        return Err(NetworkError::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        });
    }
    body.result
        .ok_or_else(|| NetworkError::InvalidResponse(format!("{method}: missing result")))
}

/// Non-2xx reply: use the JSON-RPC error object if the body carries one.
fn http_error(method: &str, status: u16, body: &str) -> NetworkError {
    match serde_json::from_str::<RpcResponse<Value>>(body) {
        Ok(RpcResponse { error: Some(err), .. }) => NetworkError::Rpc {
            code: err.code,
            message: err.message,
            data: err.data,
        },
        _ => NetworkError::Transport(format!("{method}: HTTP {status}")),
    }
}

/// The node echoes the transaction id; it must be the signature we made.
fn check_signature(
    returned: String,
    signed: &SignedTransaction,
) -> Result<String, NetworkError> {
    let expected = signed.signature_string();
    if returned != expected {
        return Err(NetworkError::InvalidResponse(format!(
            "sendTransaction: node returned {returned}, expected {expected}"
        )));
    }
    Ok(returned)
}

fn decode_blockhash(text: &str) -> Result<[u8; 32], NetworkError> {
    let bytes = bs58::decode(text)
        .into_vec()
        .map_err(|e| NetworkError::InvalidResponse(format!("blockhash: {e}")))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        NetworkError::InvalidResponse(format!("blockhash: expected 32 bytes, got {}", v.len()))
    })
}
