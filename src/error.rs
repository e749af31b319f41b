// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Workflow error taxonomy.
//!
//! Every failure of a wallet or network call is classified into one of these
//! variants at the operation boundary. Nothing past that boundary sees the
//! underlying [`RpcError`] or [`WalletError`].

use serde::Serialize;

use crate::blockchain::{AddressError, AmountError, RpcError};
use crate::wallet::WalletError;

/// Classified outcome of a failed or rejected operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    /// Bad input, rejected before any network call.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The wallet declined to sign, connect or expose a capability.
    #[error("Wallet rejected the request: {0}")]
    WalletRejection(String),

    /// The faucet refused the request because of rate limiting.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Any other submission or confirmation error.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    /// The blockhash validity window elapsed before confirmation.
    #[error("Transaction expired before confirmation: {0}")]
    Expired(String),

    #[error("No wallet connected")]
    NotConnected,

    /// Another operation holds the busy flag.
    #[error("Another operation is in progress")]
    Busy,
}

/// Stable tag for a [`WorkflowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    WalletRejection,
    RateLimited,
    NetworkFailure,
    Expired,
    NotConnected,
    Busy,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Validation(_) => ErrorKind::Validation,
            WorkflowError::WalletRejection(_) => ErrorKind::WalletRejection,
            WorkflowError::RateLimited(_) => ErrorKind::RateLimited,
            WorkflowError::NetworkFailure(_) => ErrorKind::NetworkFailure,
            WorkflowError::Expired(_) => ErrorKind::Expired,
            WorkflowError::NotConnected => ErrorKind::NotConnected,
            WorkflowError::Busy => ErrorKind::Busy,
        }
    }

    /// Rejected by the caller side before the operation started. No network
    /// call was made and no notification is emitted.
    pub fn is_caller_rejection(&self) -> bool {
        matches!(
            self,
            WorkflowError::Validation(_) | WorkflowError::NotConnected | WorkflowError::Busy
        )
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::WalletRejection => "wallet_rejection",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::NetworkFailure => "network_failure",
            ErrorKind::Expired => "expired",
            ErrorKind::NotConnected => "not_connected",
            ErrorKind::Busy => "busy",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RpcError> for WorkflowError {
    fn from(err: RpcError) -> Self {
        if err.is_rate_limited() {
            return WorkflowError::RateLimited(err.to_string());
        }
        match &err {
            RpcError::Expired { .. } => WorkflowError::Expired(err.to_string()),
            _ => WorkflowError::NetworkFailure(err.to_string()),
        }
    }
}

impl From<WalletError> for WorkflowError {
    fn from(err: WalletError) -> Self {
        match &err {
            WalletError::UserRejected | WalletError::Unavailable(_) => {
                WorkflowError::WalletRejection(err.to_string())
            }
            WalletError::NotConnected => WorkflowError::NotConnected,
            WalletError::Submission(_) => WorkflowError::NetworkFailure(err.to_string()),
        }
    }
}

impl From<AmountError> for WorkflowError {
    fn from(err: AmountError) -> Self {
        WorkflowError::Validation(err.to_string())
    }
}

impl From<AddressError> for WorkflowError {
    fn from(err: AddressError) -> Self {
        WorkflowError::Validation(format!("invalid recipient address: {err}"))
    }
}
