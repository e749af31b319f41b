// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! View state reconciled by the workflow.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::blockchain::Balance;

/// Text shown while no balance has been loaded.
pub const BALANCE_LOADING: &str = "Loading...";

/// Kind of user-initiated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Transfer,
    Airdrop,
    Sign,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OperationKind::Transfer => "transfer",
            OperationKind::Airdrop => "airdrop",
            OperationKind::Sign => "sign",
        })
    }
}

/// The operation currently in flight.
#[derive(Debug, Clone, Serialize)]
pub struct PendingOperation {
    pub id: Uuid,
    pub kind: OperationKind,
    pub started_at: DateTime<Utc>,
}

impl PendingOperation {
    pub fn start(kind: OperationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            started_at: Utc::now(),
        }
    }
}

/// Form inputs of the wallet screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    pub recipient: String,
    pub amount: String,
    pub airdrop_amount: String,
    pub message: String,
}

/// Addressable input field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Recipient,
    Amount,
    AirdropAmount,
    Message,
}

impl Inputs {
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let value = value.into();
        match field {
            Field::Recipient => self.recipient = value,
            Field::Amount => self.amount = value,
            Field::AirdropAmount => self.airdrop_amount = value,
            Field::Message => self.message = value,
        }
    }
}

/// Everything the front end renders.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// `None` until the first successful balance query.
    pub balance: Option<Balance>,
    /// Last message signature.
    pub signature: Option<Vec<u8>>,
    pub inputs: Inputs,
    pub pending: Option<PendingOperation>,
    pub busy: bool,
}

impl ViewState {
    pub fn balance_display(&self) -> String {
        match self.balance {
            Some(balance) => balance.to_string(),
            None => BALANCE_LOADING.to_string(),
        }
    }

    /// Last signature as lowercase hex.
    pub fn signature_hex(&self) -> Option<String> {
        self.signature.as_deref().map(hex::encode)
    }
}

/// Single busy flag shared by all operations.
///
/// Acquisition is a compare-and-swap, so an overlapping submission is
/// rejected instead of queued.
#[derive(Debug, Default)]
pub struct BusyFlag(AtomicBool);

impl BusyFlag {
    pub fn try_acquire(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(self))
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Clears the busy flag when dropped, on every exit path.
#[derive(Debug)]
pub struct BusyGuard<'a>(&'a BusyFlag);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0 .0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_flag_rejects_second_acquire() {
        let flag = BusyFlag::default();
        let guard = flag.try_acquire().expect("first acquire");
        assert!(flag.is_set());
        assert!(flag.try_acquire().is_none());

        drop(guard);
        assert!(!flag.is_set());
        assert!(flag.try_acquire().is_some());
    }

    #[test]
    fn balance_display_before_first_load() {
        let mut view = ViewState::default();
        assert_eq!(view.balance_display(), "Loading...");

        view.balance = Some(Balance::from_lamports(2_500_000_000));
        assert_eq!(view.balance_display(), "2.5000 SOL");
    }

    #[test]
    fn signature_renders_as_lowercase_hex() {
        let view = ViewState {
            signature: Some(vec![0xAB, 0x01, 0xFF]),
            ..Default::default()
        };
        assert_eq!(view.signature_hex().as_deref(), Some("ab01ff"));
    }

    #[test]
    fn inputs_set_by_field() {
        let mut inputs = Inputs::default();
        inputs.set(Field::Recipient, "addr");
        inputs.set(Field::Amount, "1.0");
        inputs.set(Field::AirdropAmount, "2");
        inputs.set(Field::Message, "hello");
        assert_eq!(inputs.recipient, "addr");
        assert_eq!(inputs.amount, "1.0");
        assert_eq!(inputs.airdrop_amount, "2");
        assert_eq!(inputs.message, "hello");
    }

    #[test]
    fn pending_operations_get_distinct_ids() {
        let a = PendingOperation::start(OperationKind::Transfer);
        let b = PendingOperation::start(OperationKind::Transfer);
        assert_ne!(a.id, b.id);
        assert_eq!(a.kind.to_string(), "transfer");
    }
}
