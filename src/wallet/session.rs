// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Explicit wallet session handle.

use tracing::{debug, info};

use super::{WalletError, WalletProvider};
use crate::blockchain::Pubkey;

/// How the session is opened.
///
/// Connection is always an explicit call. `auto_connect` only tells the front
/// end to issue that call once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionPolicy {
    pub auto_connect: bool,
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self { auto_connect: true }
    }
}

/// Wallet session passed into the workflow.
pub struct WalletSession<W> {
    wallet: W,
    policy: ConnectionPolicy,
}

impl<W: WalletProvider> WalletSession<W> {
    pub fn new(wallet: W, policy: ConnectionPolicy) -> Self {
        Self { wallet, policy }
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Account handle, present only while connected.
    pub fn account(&self) -> Option<Pubkey> {
        self.wallet.active_account()
    }

    pub fn is_connected(&self) -> bool {
        self.account().is_some()
    }

    /// Connect, or return the current account if already connected.
    pub async fn connect(&self) -> Result<Pubkey, WalletError> {
        if let Some(account) = self.account() {
            debug!(%account, "Wallet already connected");
            return Ok(account);
        }

        let account = self.wallet.connect().await?;
        info!(wallet = self.wallet.name(), %account, "Wallet connected");
        Ok(account)
    }

    /// Disconnect; a no-op when no session is open.
    pub async fn disconnect(&self) -> Result<(), WalletError> {
        if !self.is_connected() {
            return Ok(());
        }

        self.wallet.disconnect().await?;
        info!(wallet = self.wallet.name(), "Wallet disconnected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeWallet, Ledger};

    #[tokio::test]
    async fn connect_is_idempotent() {
        let ledger = Ledger::new(0);
        let session = WalletSession::new(FakeWallet::new(ledger.clone()), ConnectionPolicy::default());
        assert!(!session.is_connected());

        let first = session.connect().await.unwrap();
        let second = session.connect().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(ledger.connects(), 1);
    }

    #[tokio::test]
    async fn disconnect_clears_account() {
        let ledger = Ledger::new(0);
        let session = WalletSession::new(FakeWallet::new(ledger), ConnectionPolicy::default());

        session.disconnect().await.unwrap();
        session.connect().await.unwrap();
        assert!(session.account().is_some());

        session.disconnect().await.unwrap();
        assert!(session.account().is_none());
    }

    #[tokio::test]
    async fn connect_rejection_is_reported() {
        let ledger = Ledger::new(0);
        let session = WalletSession::new(
            FakeWallet::new(ledger).rejecting_connect(),
            ConnectionPolicy { auto_connect: false },
        );

        assert_eq!(session.connect().await, Err(WalletError::UserRejected));
        assert!(!session.is_connected());
        assert!(!session.policy().auto_connect);
    }
}
