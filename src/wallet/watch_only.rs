// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Watch-only wallet: exposes a configured address, cannot sign.

use std::sync::atomic::{AtomicBool, Ordering};

use super::{WalletError, WalletProvider};
use crate::blockchain::{Pubkey, RpcClient, Signature, Transaction};

const NO_SIGNER: &str = "watch-only wallet has no signing key";

/// Wallet backed by a public address only.
///
/// Balance refresh and faucet credit work; signing and transfers fail with
/// [`WalletError::Unavailable`].
pub struct WatchOnlyWallet {
    address: Option<Pubkey>,
    connected: AtomicBool,
}

impl WatchOnlyWallet {
    /// What a user of this wallet should expect.
    pub const LIMITATION: &'static str = "watch-only wallet: balance and airdrop work; \
transfer and sign need a signing wallet and will fail";

    pub fn new(address: Option<Pubkey>) -> Self {
        Self {
            address,
            connected: AtomicBool::new(false),
        }
    }
}

impl WalletProvider for WatchOnlyWallet {
    fn name(&self) -> &str {
        "watch-only"
    }

    fn active_account(&self) -> Option<Pubkey> {
        self.address.filter(|_| self.connected.load(Ordering::Acquire))
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        let address = self.address.ok_or_else(|| {
            WalletError::Unavailable("no wallet address configured".to_string())
        })?;
        self.connected.store(true, Ordering::Release);
        Ok(address)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        self.connected.store(false, Ordering::Release);
        Ok(())
    }

    async fn sign_message(&self, _message: &[u8]) -> Result<Vec<u8>, WalletError> {
        if self.active_account().is_none() {
            return Err(WalletError::NotConnected);
        }
        Err(WalletError::Unavailable(NO_SIGNER.to_string()))
    }

    async fn send_transaction<R: RpcClient>(
        &self,
        _transaction: &Transaction,
        _rpc: &R,
    ) -> Result<Signature, WalletError> {
        if self.active_account().is_none() {
            return Err(WalletError::NotConnected);
        }
        Err(WalletError::Unavailable(NO_SIGNER.to_string()))
    }
}
