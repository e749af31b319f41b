// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Request-Confirmation Workflow
//!
//! Drives each user action through prepare → submit → confirm → reconcile:
//!
//! | Operation | Prepare | Submit | Confirm |
//! |-----------|---------|--------|---------|
//! | transfer | blockhash (`finalized`) | wallet `send_transaction` | `confirmed` |
//! | faucet credit | blockhash (`finalized`) | RPC `request_airdrop` | `confirmed` |
//! | sign message | - | wallet `sign_message` | - |
//!
//! ## Failure handling
//!
//! Every failure is caught at the operation boundary, traced and turned into
//! exactly one notification. Validation, busy and not-connected rejections
//! happen before any network call and emit no notification. There is no
//! retry.
//!
//! ## Busy flag
//!
//! One flag guards all operations. A submission made while another is in
//! flight is rejected with [`WorkflowError::Busy`]. The guard is dropped on
//! every exit path. View state is never locked across a network call.

pub mod state;

use tokio::sync::Mutex;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::blockchain::{
    parse_amount, system_transfer, Balance, Cluster, Commitment, Pubkey, RpcClient, Signature,
    Transaction, TransactionReference, SOL_DECIMALS,
};
use crate::error::WorkflowError;
use crate::notify::{Notification, Notifier};
use crate::wallet::{WalletProvider, WalletSession};

pub use state::{
    BusyFlag, BusyGuard, Field, Inputs, OperationKind, PendingOperation, ViewState,
    BALANCE_LOADING,
};

pub const MSG_TRANSFER_OK: &str = "Transfer successful!";
pub const MSG_TRANSFER_FAILED: &str = "Transfer failed!";
pub const MSG_AIRDROP_OK: &str = "Airdrop successful!";
pub const MSG_AIRDROP_RATE_LIMITED: &str = "Airdrop limit exceeded. Please try again later.";
pub const MSG_AIRDROP_FAILED: &str = "Airdrop failed: An unexpected error occurred.";
pub const MSG_SIGN_OK: &str = "Message signed!";
pub const MSG_SIGN_FAILED: &str = "Message signing failed!";
pub const MSG_CONNECT_FAILED: &str = "Wallet connection failed!";

/// Result of a completed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completed {
    Transferred { signature: Signature },
    Credited { signature: Signature },
    Signed { signature_hex: String },
}

/// Outcome of a user-initiated operation.
pub type Outcome = Result<Completed, WorkflowError>;

/// Validate a transfer request without touching the network.
pub fn validate_transfer(recipient: &str, amount: &str) -> Result<(Pubkey, u64), WorkflowError> {
    let recipient = recipient.trim();
    if recipient.is_empty() {
        return Err(WorkflowError::Validation("recipient address is required".into()));
    }
    let to: Pubkey = recipient.parse()?;
    let lamports = parse_amount(amount, SOL_DECIMALS)?;
    Ok((to, lamports))
}

/// The request-confirmation workflow.
pub struct Workflow<W, R, N> {
    session: WalletSession<W>,
    rpc: R,
    notifier: N,
    cluster: Cluster,
    state: Mutex<ViewState>,
    busy: BusyFlag,
}

impl<W, R, N> Workflow<W, R, N>
where
    W: WalletProvider,
    R: RpcClient,
    N: Notifier,
{
    pub fn new(session: WalletSession<W>, rpc: R, notifier: N, cluster: Cluster) -> Self {
        Self {
            session,
            rpc,
            notifier,
            cluster,
            state: Mutex::new(ViewState::default()),
            busy: BusyFlag::default(),
        }
    }

    pub fn session(&self) -> &WalletSession<W> {
        &self.session
    }

    pub fn cluster(&self) -> Cluster {
        self.cluster
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Snapshot of the view state.
    pub async fn view(&self) -> ViewState {
        let mut view = self.state.lock().await.clone();
        view.busy = self.busy.is_set();
        view
    }

    pub async fn set_input(&self, field: Field, value: impl Into<String>) {
        self.state.lock().await.inputs.set(field, value);
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Connect the wallet and load the balance.
    pub async fn connect(&self) -> Result<Pubkey, WorkflowError> {
        match self.session.connect().await {
            Ok(account) => {
                self.load_balance(&account).await;
                Ok(account)
            }
            Err(e) => {
                warn!(error = %e, "Wallet connection failed");
                self.notifier.notify(Notification::error(MSG_CONNECT_FAILED));
                Err(e.into())
            }
        }
    }

    /// Disconnect the wallet and drop account-bound state.
    ///
    /// An operation still in flight finishes, but its balance or signature
    /// is not written back once the account is gone.
    pub async fn disconnect(&self) {
        if let Err(e) = self.session.disconnect().await {
            warn!(error = %e, "Wallet disconnect failed");
        }
        let mut state = self.state.lock().await;
        state.balance = None;
        state.signature = None;
    }

    // =========================================================================
    // Balance
    // =========================================================================

    /// Query the balance of the connected account.
    ///
    /// Without an account the display stays in its loading state. While
    /// another operation holds the busy flag the cached value is returned
    /// without a network call. Failures are traced and keep the cached value.
    pub async fn refresh_balance(&self) -> Option<Balance> {
        let Some(account) = self.session.account() else {
            self.state.lock().await.balance = None;
            return None;
        };

        let Some(_guard) = self.busy.try_acquire() else {
            debug!("Balance refresh skipped, operation in progress");
            return self.state.lock().await.balance;
        };

        self.load_balance(&account).await
    }

    /// Whether `account` is still the session account. Checked under the
    /// view-state lock before writing account-bound state.
    fn is_current(&self, account: &Pubkey) -> bool {
        self.session.account() == Some(*account)
    }

    async fn load_balance(&self, account: &Pubkey) -> Option<Balance> {
        match self.rpc.get_balance(account).await {
            Ok(lamports) => {
                let balance = Balance::from_lamports(lamports);
                let mut state = self.state.lock().await;
                if !self.is_current(account) {
                    debug!(%account, "Balance discarded, account disconnected");
                    return state.balance;
                }
                debug!(%account, lamports, "Balance refreshed");
                state.balance = Some(balance);
                Some(balance)
            }
            Err(e) => {
                warn!(%account, error = %e, "Failed to fetch balance");
                self.state.lock().await.balance
            }
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Transfer `amount` SOL from the connected account to `recipient`.
    pub async fn transfer(&self, recipient: &str, amount: &str) -> Outcome {
        let account = self.session.account().ok_or(WorkflowError::NotConnected)?;
        let _guard = self.busy.try_acquire().ok_or(WorkflowError::Busy)?;
        let (to, lamports) = validate_transfer(recipient, amount)?;

        let op = self.begin(OperationKind::Transfer).await;
        let span = info_span!("transfer", operation_id = %op.id, %account, recipient = %to, lamports);
        let result = self
            .submit_transfer(&account, &to, lamports)
            .instrument(span.clone())
            .await;

        let outcome = async {
            match result {
                Ok(signature) => {
                    info!(%signature, "Transfer confirmed");
                    self.notifier.notify(
                        Notification::success(MSG_TRANSFER_OK)
                            .with_link(self.cluster.explorer_tx_url(&signature)),
                    );
                    {
                        let mut state = self.state.lock().await;
                        state.inputs.recipient.clear();
                        state.inputs.amount.clear();
                    }
                    self.load_balance(&account).await;
                    Ok(Completed::Transferred { signature })
                }
                Err(e) => {
                    warn!(error = %e, kind = %e.kind(), "Transfer failed");
                    self.notifier.notify(Notification::error(MSG_TRANSFER_FAILED));
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await;

        self.finish().await;
        outcome
    }

    async fn submit_transfer(
        &self,
        from: &Pubkey,
        to: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, WorkflowError> {
        let mut transaction = Transaction::new(*from).with_instruction(system_transfer(from, to, lamports));

        debug!("Fetching latest blockhash");
        let anchor = self.rpc.get_latest_blockhash(Commitment::Finalized).await?;
        transaction.set_recent_blockhash(anchor.blockhash);

        debug!(blockhash = %anchor.blockhash, "Submitting transaction through wallet");
        let signature = self
            .session
            .wallet()
            .send_transaction(&transaction, &self.rpc)
            .await?;

        let reference = TransactionReference::new(signature, &anchor);
        debug!(%signature, last_valid_block_height = anchor.last_valid_block_height, "Awaiting confirmation");
        self.rpc
            .confirm_transaction(&reference, Commitment::Confirmed)
            .await?;

        Ok(reference.signature)
    }

    /// Request `amount` SOL from the cluster faucet for the connected account.
    pub async fn request_faucet_credit(&self, amount: &str) -> Outcome {
        let account = self.session.account().ok_or(WorkflowError::NotConnected)?;
        let _guard = self.busy.try_acquire().ok_or(WorkflowError::Busy)?;
        if !self.cluster.supports_airdrop() {
            return Err(WorkflowError::Validation(format!(
                "no faucet on {}",
                self.cluster
            )));
        }
        let lamports = parse_amount(amount, SOL_DECIMALS)?;

        let op = self.begin(OperationKind::Airdrop).await;
        let span = info_span!("airdrop", operation_id = %op.id, %account, lamports);
        let result = self
            .submit_airdrop(&account, lamports)
            .instrument(span.clone())
            .await;

        let outcome = async {
            match result {
                Ok(signature) => {
                    info!(%signature, "Airdrop confirmed");
                    self.notifier.notify(
                        Notification::success(MSG_AIRDROP_OK)
                            .with_link(self.cluster.explorer_tx_url(&signature)),
                    );
                    self.state.lock().await.inputs.airdrop_amount.clear();
                    self.load_balance(&account).await;
                    Ok(Completed::Credited { signature })
                }
                Err(e) => {
                    warn!(error = %e, kind = %e.kind(), "Airdrop failed");
                    let message = match e {
                        WorkflowError::RateLimited(_) => MSG_AIRDROP_RATE_LIMITED,
                        _ => MSG_AIRDROP_FAILED,
                    };
                    self.notifier.notify(Notification::error(message));
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await;

        self.finish().await;
        outcome
    }

    async fn submit_airdrop(&self, account: &Pubkey, lamports: u64) -> Result<Signature, WorkflowError> {
        debug!("Fetching latest blockhash");
        let anchor = self.rpc.get_latest_blockhash(Commitment::Finalized).await?;

        debug!("Requesting faucet credit");
        let signature = self.rpc.request_airdrop(account, lamports).await?;

        let reference = TransactionReference::new(signature, &anchor);
        debug!(%signature, "Awaiting confirmation");
        self.rpc
            .confirm_transaction(&reference, Commitment::Confirmed)
            .await?;

        Ok(reference.signature)
    }

    /// Sign `text` with the connected wallet.
    pub async fn sign_message(&self, text: &str) -> Outcome {
        let account = self.session.account().ok_or(WorkflowError::NotConnected)?;
        let _guard = self.busy.try_acquire().ok_or(WorkflowError::Busy)?;

        let op = self.begin(OperationKind::Sign).await;
        let span = info_span!("sign_message", operation_id = %op.id, %account, bytes = text.len());

        let outcome = async {
            let signed = self
                .session
                .wallet()
                .sign_message(text.as_bytes())
                .await
                .map_err(WorkflowError::from)
                .and_then(|bytes| {
                    if bytes.is_empty() {
                        Err(WorkflowError::WalletRejection("wallet returned an empty signature".into()))
                    } else {
                        Ok(bytes)
                    }
                });

            match signed {
                Ok(bytes) => {
                    let signature_hex = hex::encode(&bytes);
                    info!(signature = %signature_hex, "Message signed");
                    {
                        let mut state = self.state.lock().await;
                        if self.is_current(&account) {
                            state.signature = Some(bytes);
                        }
                        state.inputs.message.clear();
                    }
                    self.notifier.notify(Notification::success(MSG_SIGN_OK));
                    Ok(Completed::Signed { signature_hex })
                }
                Err(e) => {
                    warn!(error = %e, kind = %e.kind(), "Message signing failed");
                    self.notifier.notify(Notification::error(MSG_SIGN_FAILED));
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await;

        self.finish().await;
        outcome
    }

    // =========================================================================
    // Form submission
    // =========================================================================

    /// Transfer using the recipient and amount inputs.
    pub async fn submit_transfer_form(&self) -> Outcome {
        let inputs = self.state.lock().await.inputs.clone();
        self.transfer(&inputs.recipient, &inputs.amount).await
    }

    /// Faucet credit using the airdrop amount input.
    pub async fn submit_airdrop_form(&self) -> Outcome {
        let amount = self.state.lock().await.inputs.airdrop_amount.clone();
        self.request_faucet_credit(&amount).await
    }

    /// Sign the message input.
    pub async fn submit_sign_form(&self) -> Outcome {
        let message = self.state.lock().await.inputs.message.clone();
        self.sign_message(&message).await
    }

    async fn begin(&self, kind: OperationKind) -> PendingOperation {
        let op = PendingOperation::start(kind);
        self.state.lock().await.pending = Some(op.clone());
        op
    }

    async fn finish(&self) {
        self.state.lock().await.pending = None;
    }
}
