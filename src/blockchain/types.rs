// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::transactions::format_fixed;

/// Lamports in one SOL (the fixed display divisor).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Number of decimal places between lamports and SOL.
pub const SOL_DECIMALS: u8 = 9;

/// Decimal places shown for a balance.
pub const BALANCE_DISPLAY_PLACES: u8 = 4;

const EXPLORER_URL: &str = "https://explorer.solana.com";

/// Solana cluster the wallet talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
}

impl Cluster {
    /// Cluster name as used by the explorer and configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Localnet => "localnet",
        }
    }

    /// Public JSON-RPC endpoint for the cluster.
    pub fn rpc_url(&self) -> &'static str {
        match self {
            Cluster::Devnet => "https://api.devnet.solana.com",
            Cluster::Testnet => "https://api.testnet.solana.com",
            Cluster::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Cluster::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Whether the cluster exposes a faucet (`requestAirdrop`).
    pub fn supports_airdrop(&self) -> bool {
        !matches!(self, Cluster::MainnetBeta)
    }

    /// Explorer URL for a transaction signature on this cluster.
    pub fn explorer_tx_url(&self, signature: &Signature) -> String {
        match self {
            Cluster::MainnetBeta => format!("{EXPLORER_URL}/tx/{signature}"),
            Cluster::Localnet => format!(
                "{EXPLORER_URL}/tx/{signature}?cluster=custom&customUrl=http%3A%2F%2F127.0.0.1%3A8899"
            ),
            other => format!("{EXPLORER_URL}/tx/{signature}?cluster={}", other.name()),
        }
    }
}

impl Default for Cluster {
    fn default() -> Self {
        Self::Devnet
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            "localnet" | "localhost" => Ok(Cluster::Localnet),
            other => Err(format!(
                "unknown cluster `{other}` (expected devnet, testnet, mainnet-beta or localnet)"
            )),
        }
    }
}

/// Commitment level used when reading or confirming state.
///
/// Ordered from weakest to strongest so a status can be compared against the
/// level a caller waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl fmt::Display for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced while decoding base58 account keys, hashes and signatures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("base58 decode failed: {0}")]
    InvalidBase58(String),

    #[error("expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

fn decode_base58<const N: usize>(raw: &str) -> Result<[u8; N], AddressError> {
    let bytes = bs58::decode(raw.trim())
        .into_vec()
        .map_err(|e| AddressError::InvalidBase58(e.to_string()))?;

    bytes.try_into().map_err(|v: Vec<u8>| AddressError::InvalidLength {
        expected: N,
        actual: v.len(),
    })
}

/// A 32-byte Ed25519 public key, the account handle on Solana.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Pubkey {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        decode_base58::<32>(raw).map(Self)
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pubkey({self})")
    }
}

/// A recent blockhash used to anchor a transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Blockhash([u8; 32]);

impl Blockhash {
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Blockhash {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        decode_base58::<32>(raw).map(Self)
    }
}

impl fmt::Display for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Blockhash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blockhash({self})")
    }
}

/// A 64-byte transaction signature, the identifier of a submitted transaction.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; 64]);

impl Signature {
    pub const fn new(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl FromStr for Signature {
    type Err = AddressError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        decode_base58::<64>(raw).map(Self)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

/// Latest blockhash together with the last block height at which a
/// transaction anchored to it can still land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatestBlockhash {
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

/// A submitted transaction waiting for confirmation.
///
/// Created at submission time, consumed once by confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionReference {
    pub signature: Signature,
    pub blockhash: Blockhash,
    pub last_valid_block_height: u64,
}

impl TransactionReference {
    pub fn new(signature: Signature, anchor: &LatestBlockhash) -> Self {
        Self {
            signature,
            blockhash: anchor.blockhash,
            last_valid_block_height: anchor.last_valid_block_height,
        }
    }
}

/// Native balance of an account, in lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance {
    pub lamports: u64,
}

impl Balance {
    pub const fn from_lamports(lamports: u64) -> Self {
        Self { lamports }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} SOL",
            format_fixed(self.lamports, SOL_DECIMALS, BALANCE_DISPLAY_PLACES)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_PROGRAM: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    #[test]
    fn system_program_address_is_all_ones() {
        let key = Pubkey::new([0u8; 32]);
        assert_eq!(key.to_string(), "11111111111111111111111111111111");
    }

    #[test]
    fn pubkey_parses_known_address() {
        let key: Pubkey = TOKEN_PROGRAM.parse().unwrap();
        assert_eq!(key.to_string(), TOKEN_PROGRAM);
    }

    #[test]
    fn pubkey_rejects_garbage_and_short_input() {
        assert!(matches!(
            "not-a-valid-address!!!".parse::<Pubkey>(),
            Err(AddressError::InvalidBase58(_))
        ));
        assert_eq!(
            "1".parse::<Pubkey>(),
            Err(AddressError::InvalidLength {
                expected: 32,
                actual: 1
            })
        );
    }

    #[test]
    fn signature_requires_64_bytes() {
        let sig = Signature::new([7u8; 64]);
        let parsed: Signature = sig.to_string().parse().unwrap();
        assert_eq!(parsed, sig);
        assert!(TOKEN_PROGRAM.parse::<Signature>().is_err());
    }

    #[test]
    fn cluster_parsing_accepts_aliases() {
        assert_eq!("DEVNET".parse::<Cluster>().unwrap(), Cluster::Devnet);
        assert_eq!("mainnet".parse::<Cluster>().unwrap(), Cluster::MainnetBeta);
        assert_eq!("localhost".parse::<Cluster>().unwrap(), Cluster::Localnet);
        assert!("fuji".parse::<Cluster>().is_err());
    }

    #[test]
    fn explorer_links_carry_cluster() {
        let sig = Signature::new([1u8; 64]);
        let devnet = Cluster::Devnet.explorer_tx_url(&sig);
        assert!(devnet.ends_with("?cluster=devnet"));
        assert!(devnet.contains(&sig.to_string()));

        let mainnet = Cluster::MainnetBeta.explorer_tx_url(&sig);
        assert!(!mainnet.contains("cluster="));
    }

    #[test]
    fn faucet_not_available_on_mainnet() {
        assert!(Cluster::Devnet.supports_airdrop());
        assert!(Cluster::Localnet.supports_airdrop());
        assert!(!Cluster::MainnetBeta.supports_airdrop());
    }

    #[test]
    fn commitment_ordering() {
        assert!(Commitment::Processed < Commitment::Confirmed);
        assert!(Commitment::Confirmed < Commitment::Finalized);
    }

    #[test]
    fn balance_display_uses_four_places() {
        assert_eq!(Balance::from_lamports(2_500_000_000).to_string(), "2.5000 SOL");
        assert_eq!(Balance::from_lamports(0).to_string(), "0.0000 SOL");
        assert_eq!(Balance::from_lamports(1_234_567_890).to_string(), "1.2346 SOL");
    }
}
