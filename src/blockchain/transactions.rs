// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transfer instruction building and amount conversion.
//!
//! Only the instruction and its account metas are built here. Compiling the
//! message, signing it and encoding the wire transaction is the wallet's job.

use super::types::{Blockhash, Pubkey};

/// The System Program (all-zero key).
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::new([0u8; 32]);

/// `SystemInstruction::Transfer` discriminant.
const SYSTEM_TRANSFER_INDEX: u32 = 2;

/// Account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn writable(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Build a System Program transfer of `lamports` from `from` to `to`.
///
/// Data layout: 4-byte little-endian instruction index followed by the
/// 8-byte little-endian lamport amount.
pub fn system_transfer(from: &Pubkey, to: &Pubkey, lamports: u64) -> Instruction {
    let mut data = Vec::with_capacity(12);
    data.extend_from_slice(&SYSTEM_TRANSFER_INDEX.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction {
        program_id: SYSTEM_PROGRAM_ID,
        accounts: vec![
            AccountMeta::writable(*from, true),
            AccountMeta::writable(*to, false),
        ],
        data,
    }
}

/// Lamports carried by a System Program transfer instruction, if it is one.
pub fn transfer_lamports(instruction: &Instruction) -> Option<u64> {
    if instruction.program_id != SYSTEM_PROGRAM_ID || instruction.data.len() != 12 {
        return None;
    }
    let (index, amount) = instruction.data.split_at(4);
    if u32::from_le_bytes(index.try_into().ok()?) != SYSTEM_TRANSFER_INDEX {
        return None;
    }
    Some(u64::from_le_bytes(amount.try_into().ok()?))
}

/// Unsigned transaction handed to the wallet for signing and broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub fee_payer: Pubkey,
    pub recent_blockhash: Option<Blockhash>,
    pub instructions: Vec<Instruction>,
}

impl Transaction {
    pub fn new(fee_payer: Pubkey) -> Self {
        Self {
            fee_payer,
            recent_blockhash: None,
            instructions: Vec::new(),
        }
    }

    pub fn with_instruction(mut self, instruction: Instruction) -> Self {
        self.instructions.push(instruction);
        self
    }

    pub fn set_recent_blockhash(&mut self, blockhash: Blockhash) {
        self.recent_blockhash = Some(blockhash);
    }
}

/// Amount parsing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount is required")]
    Empty,

    #[error("Amount `{0}` is not a number")]
    NotANumber(String),

    #[error("Amount must be greater than zero")]
    NonPositive,

    #[error("Too many decimal places (max {0})")]
    TooManyDecimals(u8),

    #[error("Amount overflow")]
    Overflow,
}

/// Parse a human-readable amount (e.g. "1.5") into base units.
///
/// # Arguments
/// * `amount` - Decimal amount, optionally with a fractional part
/// * `decimals` - Number of decimals between display and base units
///
/// Negative and zero amounts are rejected.
pub fn parse_amount(amount: &str, decimals: u8) -> Result<u64, AmountError> {
    let trimmed = amount.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Empty);
    }
    if trimmed.starts_with('-') {
        return Err(AmountError::NonPositive);
    }

    let (whole_str, decimal_str) = match trimmed.split_once('.') {
        Some((whole, decimal)) => (whole, decimal),
        None => (trimmed, ""),
    };

    let is_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if (whole_str.is_empty() && decimal_str.is_empty())
        || !is_digits(whole_str)
        || !is_digits(decimal_str)
    {
        return Err(AmountError::NotANumber(trimmed.to_string()));
    }

    if decimal_str.len() > decimals as usize {
        return Err(AmountError::TooManyDecimals(decimals));
    }

    let whole = if whole_str.is_empty() {
        0u128
    } else {
        whole_str
            .parse::<u128>()
            .map_err(|_| AmountError::Overflow)?
    };

    let decimal_part = if decimal_str.is_empty() {
        0u128
    } else {
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", decimal_str, width = decimals as usize);
        padded.parse::<u128>().map_err(|_| AmountError::Overflow)?
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or(AmountError::Overflow)?;

    if total == 0 {
        return Err(AmountError::NonPositive);
    }

    u64::try_from(total).map_err(|_| AmountError::Overflow)
}

/// Format base units with exactly `places` decimals, rounding half up.
pub fn format_fixed(amount: u64, decimals: u8, places: u8) -> String {
    let places = places.min(decimals);
    let step = 10u128.pow((decimals - places) as u32);
    let rounded = (amount as u128 + step / 2) / step;

    if places == 0 {
        return rounded.to_string();
    }

    let unit = 10u128.pow(places as u32);
    format!(
        "{}.{:0>width$}",
        rounded / unit,
        rounded % unit,
        width = places as usize
    )
}
