// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solnet Wallet - Solana wallet workflow
//!
//! Balance refresh, SOL transfers, faucet credit and message signing, each
//! driven through prepare → submit → confirm → reconcile with user-facing
//! notifications.
//!
//! ## Modules
//!
//! - `blockchain` - Solana types, instructions and JSON-RPC client
//! - `wallet` - Wallet providers and the session handle
//! - `workflow` - Request-confirmation workflow and view state
//! - `notify` - Notifications
//! - `console` - Terminal front end

pub mod blockchain;
pub mod config;
pub mod console;
pub mod error;
pub mod notify;
pub mod wallet;
pub mod workflow;

#[cfg(test)]
pub(crate) mod testing;
