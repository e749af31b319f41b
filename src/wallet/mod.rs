// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet capability providers and the session handle built on them.
//!
//! A provider owns the account keys and decides whether to sign. The
//! workflow never sees key material; it only asks for a signature over a
//! message or for a transaction to be signed and broadcast.

pub mod session;
pub mod watch_only;

use std::future::Future;

use crate::blockchain::{Pubkey, RpcClient, Signature, Transaction};

pub use session::{ConnectionPolicy, WalletSession};
pub use watch_only::WatchOnlyWallet;

/// Errors reported by a wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wallet capability unavailable: {0}")]
    Unavailable(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),
}

/// A wallet that can expose an account, sign messages and submit
/// transactions.
pub trait WalletProvider: Send + Sync {
    /// Human-readable wallet name.
    fn name(&self) -> &str;

    /// Account of the active session, if connected.
    fn active_account(&self) -> Option<Pubkey>;

    /// Open a session and return its account.
    fn connect(&self) -> impl Future<Output = Result<Pubkey, WalletError>> + Send;

    /// Close the session.
    fn disconnect(&self) -> impl Future<Output = Result<(), WalletError>> + Send;

    /// Sign arbitrary bytes with the session key.
    fn sign_message(
        &self,
        message: &[u8],
    ) -> impl Future<Output = Result<Vec<u8>, WalletError>> + Send;

    /// Sign `transaction` and broadcast it through `rpc`.
    fn send_transaction<R: RpcClient>(
        &self,
        transaction: &Transaction,
        rpc: &R,
    ) -> impl Future<Output = Result<Signature, WalletError>> + Send;
}
