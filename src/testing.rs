// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory wallet, RPC and notifier fakes sharing one call ledger.

use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use crate::blockchain::{
    transfer_lamports, Blockhash, Commitment, LatestBlockhash, Pubkey, RpcClient, RpcError,
    Signature, Transaction, TransactionReference,
};
use crate::notify::{Notification, Notifier};
use crate::wallet::{WalletError, WalletProvider};

pub const ACCOUNT: Pubkey = Pubkey::new([7u8; 32]);
pub const BLOCKHASH: Blockhash = Blockhash::new([9u8; 32]);
pub const SIGNATURE: Signature = Signature::new([5u8; 64]);
pub const LAST_VALID_BLOCK_HEIGHT: u64 = 150;

/// A network or wallet call observed by the fakes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetBalance,
    LatestBlockhash(Commitment),
    RequestAirdrop(u64),
    /// Wallet sign-and-send of a transfer of this many lamports.
    SendTransaction(u64),
    Confirm(Commitment),
    SignMessage(Vec<u8>),
}

#[derive(Default)]
struct LedgerState {
    calls: Vec<Call>,
    lamports: u64,
    /// Balance change applied once the pending transaction confirms.
    pending: i128,
    connects: usize,
    last_transaction: Option<Transaction>,
    fail_balance: Option<RpcError>,
    fail_blockhash: Option<RpcError>,
    fail_airdrop: Option<RpcError>,
}

/// Shared chain and call log.
pub struct Ledger {
    state: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(lamports: u64) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(LedgerState {
                lamports,
                ..Default::default()
            }),
        })
    }

    fn with<T>(&self, f: impl FnOnce(&mut LedgerState) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    fn record(&self, call: Call) {
        self.with(|s| s.calls.push(call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with(|s| s.calls.clear());
    }

    pub fn connects(&self) -> usize {
        self.with(|s| s.connects)
    }

    pub fn balance(&self) -> u64 {
        self.with(|s| s.lamports)
    }

    pub fn last_transaction(&self) -> Option<Transaction> {
        self.with(|s| s.last_transaction.clone())
    }

    pub fn fail_balance(&self, err: RpcError) {
        self.with(|s| s.fail_balance = Some(err));
    }

    pub fn fail_blockhash(&self, err: RpcError) {
        self.with(|s| s.fail_blockhash = Some(err));
    }

    pub fn fail_airdrop(&self, err: RpcError) {
        self.with(|s| s.fail_airdrop = Some(err));
    }
}

/// RPC fake backed by a [`Ledger`].
pub struct FakeRpc {
    ledger: Arc<Ledger>,
    expire: bool,
    gate: Option<Arc<Notify>>,
}

impl FakeRpc {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            expire: false,
            gate: None,
        }
    }

    /// Confirmation never lands inside the validity window.
    pub fn expiring(mut self) -> Self {
        self.expire = true;
        self
    }

    /// Confirmation waits until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }
}

impl RpcClient for FakeRpc {
    async fn get_balance(&self, _account: &Pubkey) -> Result<u64, RpcError> {
        self.ledger.with(|s| {
            s.calls.push(Call::GetBalance);
            match &s.fail_balance {
                Some(err) => Err(err.clone()),
                None => Ok(s.lamports),
            }
        })
    }

    async fn get_latest_blockhash(
        &self,
        commitment: Commitment,
    ) -> Result<LatestBlockhash, RpcError> {
        self.ledger.with(|s| {
            s.calls.push(Call::LatestBlockhash(commitment));
            match &s.fail_blockhash {
                Some(err) => Err(err.clone()),
                None => Ok(LatestBlockhash {
                    blockhash: BLOCKHASH,
                    last_valid_block_height: LAST_VALID_BLOCK_HEIGHT,
                }),
            }
        })
    }

    async fn request_airdrop(&self, _account: &Pubkey, lamports: u64) -> Result<Signature, RpcError> {
        self.ledger.with(|s| {
            s.calls.push(Call::RequestAirdrop(lamports));
            match &s.fail_airdrop {
                Some(err) => Err(err.clone()),
                None => {
                    s.pending = i128::from(lamports);
                    Ok(SIGNATURE)
                }
            }
        })
    }

    /// Broadcasts are recorded by the wallet as [`Call::SendTransaction`].
    async fn send_raw_transaction(&self, _wire: &[u8]) -> Result<Signature, RpcError> {
        Ok(SIGNATURE)
    }

    async fn confirm_transaction(
        &self,
        reference: &TransactionReference,
        commitment: Commitment,
    ) -> Result<(), RpcError> {
        self.ledger.record(Call::Confirm(commitment));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.ledger.with(|s| {
            let delta = std::mem::take(&mut s.pending);
            if self.expire {
                return Err(RpcError::Expired {
                    signature: reference.signature,
                    last_valid_block_height: reference.last_valid_block_height,
                });
            }
            let lamports = i128::from(s.lamports) + delta;
            s.lamports = u64::try_from(lamports.max(0)).unwrap_or(u64::MAX);
            Ok(())
        })
    }
}

/// Wallet fake backed by a [`Ledger`].
pub struct FakeWallet {
    ledger: Arc<Ledger>,
    account: Mutex<Option<Pubkey>>,
    reject_connect: bool,
    reject_send: bool,
    reject_sign: bool,
    sign_gate: Option<Arc<Notify>>,
}

impl FakeWallet {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            account: Mutex::new(None),
            reject_connect: false,
            reject_send: false,
            reject_sign: false,
            sign_gate: None,
        }
    }

    /// Signing waits until `gate` is notified.
    pub fn gated_sign(mut self, gate: Arc<Notify>) -> Self {
        self.sign_gate = Some(gate);
        self
    }

    pub fn rejecting_connect(mut self) -> Self {
        self.reject_connect = true;
        self
    }

    pub fn rejecting_send(mut self) -> Self {
        self.reject_send = true;
        self
    }

    pub fn rejecting_sign(mut self) -> Self {
        self.reject_sign = true;
        self
    }
}

impl WalletProvider for FakeWallet {
    fn name(&self) -> &str {
        "fake"
    }

    fn active_account(&self) -> Option<Pubkey> {
        *self.account.lock().unwrap()
    }

    async fn connect(&self) -> Result<Pubkey, WalletError> {
        if self.reject_connect {
            return Err(WalletError::UserRejected);
        }
        self.ledger.with(|s| s.connects += 1);
        *self.account.lock().unwrap() = Some(ACCOUNT);
        Ok(ACCOUNT)
    }

    async fn disconnect(&self) -> Result<(), WalletError> {
        *self.account.lock().unwrap() = None;
        Ok(())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, WalletError> {
        if self.active_account().is_none() {
            return Err(WalletError::NotConnected);
        }
        if self.reject_sign {
            return Err(WalletError::UserRejected);
        }
        if let Some(gate) = &self.sign_gate {
            gate.notified().await;
        }
        self.ledger.record(Call::SignMessage(message.to_vec()));
        Ok(vec![0xab; 64])
    }

    async fn send_transaction<R: RpcClient>(
        &self,
        transaction: &Transaction,
        rpc: &R,
    ) -> Result<Signature, WalletError> {
        if self.reject_send {
            return Err(WalletError::UserRejected);
        }
        let lamports = transaction
            .instructions
            .first()
            .and_then(transfer_lamports)
            .unwrap_or_default();
        self.ledger.with(|s| {
            s.calls.push(Call::SendTransaction(lamports));
            s.pending = -i128::from(lamports);
            s.last_transaction = Some(transaction.clone());
        });

        rpc.send_raw_transaction(&[])
            .await
            .map_err(|e| WalletError::Submission(e.to_string()))
    }
}

/// Notifier that keeps everything it receives.
#[derive(Default)]
pub struct RecordingNotifier {
    received: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.received.lock().unwrap().clone()
    }

    pub fn messages(&self) -> Vec<String> {
        self.all().into_iter().map(|n| n.message).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}
