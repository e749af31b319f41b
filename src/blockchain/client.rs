// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana JSON-RPC client for balance, faucet and confirmation calls.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::types::*;
use crate::config::Config;

/// HTTP status returned by the faucet when the caller is rate limited.
pub const RATE_LIMIT_STATUS: u16 = 429;

const RATE_LIMIT_PREFIX: &str = "429";

/// Network operations the workflow depends on.
///
/// `send_raw_transaction` is not called by the workflow itself; wallet
/// providers use it to broadcast the transactions they sign.
pub trait RpcClient: Send + Sync {
    /// Balance of `account` in lamports.
    fn get_balance(&self, account: &Pubkey) -> impl Future<Output = Result<u64, RpcError>> + Send;

    /// Latest blockhash and its last valid block height.
    fn get_latest_blockhash(
        &self,
        commitment: Commitment,
    ) -> impl Future<Output = Result<LatestBlockhash, RpcError>> + Send;

    /// Ask the cluster faucet to credit `account`.
    fn request_airdrop(
        &self,
        account: &Pubkey,
        lamports: u64,
    ) -> impl Future<Output = Result<Signature, RpcError>> + Send;

    /// Broadcast a signed wire transaction.
    fn send_raw_transaction(
        &self,
        wire: &[u8],
    ) -> impl Future<Output = Result<Signature, RpcError>> + Send;

    /// Wait until `reference` reaches `commitment` or its blockhash expires.
    fn confirm_transaction(
        &self,
        reference: &TransactionReference,
        commitment: Commitment,
    ) -> impl Future<Output = Result<(), RpcError>> + Send;
}

/// Errors that can occur during RPC operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RpcError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-success HTTP status. The message starts with the status code.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Failed to decode RPC response: {0}")]
    Decode(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Signature {signature} has expired: block height exceeded {last_valid_block_height}")]
    Expired {
        signature: Signature,
        last_valid_block_height: u64,
    },
}

impl RpcError {
    /// Whether the endpoint refused the request because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            RpcError::Http { status, .. } => *status == RATE_LIMIT_STATUS,
            RpcError::Rpc { message, .. } | RpcError::Transport(message) => {
                message.starts_with(RATE_LIMIT_PREFIX)
            }
            _ => false,
        }
    }
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

/// Result wrapper for methods that return `{ context, value }`.
#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockhashValue {
    blockhash: String,
    last_valid_block_height: u64,
}

/// Entry of a `getSignatureStatuses` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureStatus {
    pub slot: u64,
    pub confirmations: Option<u64>,
    pub err: Option<Value>,
    pub confirmation_status: Option<Commitment>,
}

impl SignatureStatus {
    /// Whether this status satisfies `commitment`.
    ///
    /// Nodes that omit `confirmationStatus` report rooted transactions with
    /// `confirmations: null`.
    pub fn satisfies(&self, commitment: Commitment) -> bool {
        let level = match (self.confirmation_status, self.confirmations) {
            (Some(level), _) => level,
            (None, None) => Commitment::Finalized,
            (None, Some(_)) => Commitment::Processed,
        };
        level >= commitment
    }
}

/// Decode a JSON-RPC response body into its `result`.
fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, RpcError> {
    let response: RpcResponse<T> =
        serde_json::from_str(body).map_err(|e| RpcError::Decode(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(RpcError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::Decode("response has neither result nor error".to_string()))
}

fn parse_signature(raw: &str) -> Result<Signature, RpcError> {
    raw.parse()
        .map_err(|e| RpcError::Decode(format!("invalid signature `{raw}`: {e}")))
}

/// JSON-RPC client for a Solana cluster over HTTP.
pub struct SolanaRpcClient {
    http: reqwest::Client,
    url: Url,
    poll_interval: Duration,
    next_id: AtomicU64,
}

impl SolanaRpcClient {
    /// Create a client for the given endpoint.
    pub fn new(
        url: Url,
        request_timeout: Duration,
        poll_interval: Duration,
    ) -> Result<Self, RpcError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RpcError::InvalidRpcUrl(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            url,
            poll_interval,
            next_id: AtomicU64::new(1),
        })
    }

    /// Create a client from runtime configuration.
    pub fn from_config(config: &Config) -> Result<Self, RpcError> {
        Self::new(
            config.rpc_url.clone(),
            config.request_timeout,
            config.confirm_poll_interval,
        )
    }

    /// Issue one JSON-RPC call and decode its result.
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::debug!(method, id, "RPC request");

        let response = self
            .http
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(RpcError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown"),
                    text.trim()
                ),
            });
        }

        decode_response(&text)
    }

    /// Status of a single signature, `None` if the cluster has not seen it.
    pub async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcError> {
        let statuses: WithContext<Vec<Option<SignatureStatus>>> = self
            .call(
                "getSignatureStatuses",
                json!([[signature.to_string()], { "searchTransactionHistory": false }]),
            )
            .await?;

        Ok(statuses.value.into_iter().next().flatten())
    }

    /// Current block height at `commitment`.
    pub async fn get_block_height(&self, commitment: Commitment) -> Result<u64, RpcError> {
        self.call("getBlockHeight", json!([{ "commitment": commitment.as_str() }]))
            .await
    }

    /// Check a status once: `Some(Ok)` when confirmed, `Some(Err)` when the
    /// transaction failed, `None` when still pending.
    fn check_status(
        status: Option<&SignatureStatus>,
        commitment: Commitment,
    ) -> Option<Result<(), RpcError>> {
        let status = status?;
        if let Some(err) = &status.err {
            return Some(Err(RpcError::TransactionFailed(err.to_string())));
        }
        status.satisfies(commitment).then_some(Ok(()))
    }
}

impl RpcClient for SolanaRpcClient {
    async fn get_balance(&self, account: &Pubkey) -> Result<u64, RpcError> {
        let balance: WithContext<u64> = self
            .call(
                "getBalance",
                json!([account.to_string(), { "commitment": Commitment::Confirmed.as_str() }]),
            )
            .await?;
        Ok(balance.value)
    }

    async fn get_latest_blockhash(
        &self,
        commitment: Commitment,
    ) -> Result<LatestBlockhash, RpcError> {
        let latest: WithContext<BlockhashValue> = self
            .call(
                "getLatestBlockhash",
                json!([{ "commitment": commitment.as_str() }]),
            )
            .await?;

        let blockhash = latest.value.blockhash.parse().map_err(|e| {
            RpcError::Decode(format!("invalid blockhash `{}`: {e}", latest.value.blockhash))
        })?;

        Ok(LatestBlockhash {
            blockhash,
            last_valid_block_height: latest.value.last_valid_block_height,
        })
    }

    async fn request_airdrop(&self, account: &Pubkey, lamports: u64) -> Result<Signature, RpcError> {
        let signature: String = self
            .call("requestAirdrop", json!([account.to_string(), lamports]))
            .await?;
        parse_signature(&signature)
    }

    async fn send_raw_transaction(&self, wire: &[u8]) -> Result<Signature, RpcError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(wire);
        let signature: String = self
            .call(
                "sendTransaction",
                json!([encoded, {
                    "encoding": "base64",
                    "preflightCommitment": Commitment::Confirmed.as_str(),
                }]),
            )
            .await?;
        parse_signature(&signature)
    }

    async fn confirm_transaction(
        &self,
        reference: &TransactionReference,
        commitment: Commitment,
    ) -> Result<(), RpcError> {
        loop {
            let status = self.get_signature_status(&reference.signature).await?;
            if let Some(done) = Self::check_status(status.as_ref(), commitment) {
                return done;
            }

            let height = self.get_block_height(commitment).await?;
            if height > reference.last_valid_block_height {
                // The transaction may have landed between the two reads.
                let status = self.get_signature_status(&reference.signature).await?;
                if let Some(done) = Self::check_status(status.as_ref(), commitment) {
                    return done;
                }
                return Err(RpcError::Expired {
                    signature: reference.signature,
                    last_valid_block_height: reference.last_valid_block_height,
                });
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
