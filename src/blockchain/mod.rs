// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana integration.
//!
//! This module provides:
//! - Cluster, address, signature and balance types
//! - System transfer instructions and amount parsing
//! - A JSON-RPC client for balances, the faucet and confirmation polling

pub mod client;
pub mod transactions;
pub mod types;

pub use client::{RpcClient, RpcError, SignatureStatus, SolanaRpcClient, RATE_LIMIT_STATUS};
pub use transactions::{
    parse_amount, system_transfer, transfer_lamports, AccountMeta, AmountError,
    Instruction, Transaction, SYSTEM_PROGRAM_ID,
};
pub use types::*;
