// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SOLNET_CLUSTER` | `devnet`, `testnet`, `mainnet-beta` or `localnet` | `devnet` |
//! | `SOLNET_RPC_URL` | JSON-RPC endpoint override | cluster endpoint |
//! | `SOLNET_WALLET_ADDRESS` | Address exposed by the watch-only wallet | none |
//! | `SOLNET_AUTO_CONNECT` | Connect the wallet at startup | `true` |
//! | `SOLNET_CONFIRM_POLL_MS` | Confirmation poll interval in milliseconds | `500` |
//! | `SOLNET_REQUEST_TIMEOUT_SECS` | HTTP request timeout in seconds | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,reqwest=warn,hyper=warn` |

use std::time::Duration;

use url::Url;

use crate::blockchain::{Cluster, Pubkey};

pub const CLUSTER_ENV: &str = "SOLNET_CLUSTER";
pub const RPC_URL_ENV: &str = "SOLNET_RPC_URL";
pub const WALLET_ADDRESS_ENV: &str = "SOLNET_WALLET_ADDRESS";
pub const AUTO_CONNECT_ENV: &str = "SOLNET_AUTO_CONNECT";
pub const CONFIRM_POLL_MS_ENV: &str = "SOLNET_CONFIRM_POLL_MS";
pub const REQUEST_TIMEOUT_SECS_ENV: &str = "SOLNET_REQUEST_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,reqwest=warn,hyper=warn";

const DEFAULT_CONFIRM_POLL_MS: u64 = 500;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Configuration errors, reported before anything starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            name,
            reason: reason.into(),
        }
    }
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub cluster: Cluster,
    pub rpc_url: Url,
    pub wallet_address: Option<Pubkey>,
    pub auto_connect: bool,
    pub confirm_poll_interval: Duration,
    pub request_timeout: Duration,
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let cluster = match read(CLUSTER_ENV) {
            Some(raw) => raw
                .parse::<Cluster>()
                .map_err(|e| ConfigError::invalid(CLUSTER_ENV, e))?,
            None => Cluster::default(),
        };

        let rpc_raw = read(RPC_URL_ENV).unwrap_or_else(|| cluster.rpc_url().to_string());
        let rpc_url = Url::parse(rpc_raw.trim())
            .map_err(|e| ConfigError::invalid(RPC_URL_ENV, e.to_string()))?;

        let wallet_address = read(WALLET_ADDRESS_ENV)
            .map(|raw| raw.parse::<Pubkey>())
            .transpose()
            .map_err(|e| ConfigError::invalid(WALLET_ADDRESS_ENV, e.to_string()))?;

        let auto_connect = match read(AUTO_CONNECT_ENV) {
            Some(raw) => parse_bool(&raw).ok_or_else(|| {
                ConfigError::invalid(AUTO_CONNECT_ENV, format!("expected a boolean, got `{raw}`"))
            })?,
            None => true,
        };

        let confirm_poll_ms = parse_positive(read(CONFIRM_POLL_MS_ENV), CONFIRM_POLL_MS_ENV)?
            .unwrap_or(DEFAULT_CONFIRM_POLL_MS);
        let request_timeout_secs =
            parse_positive(read(REQUEST_TIMEOUT_SECS_ENV), REQUEST_TIMEOUT_SECS_ENV)?
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_format = match read(LOG_FORMAT_ENV).map(|v| v.trim().to_ascii_lowercase()) {
            None => LogFormat::Pretty,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "json" => LogFormat::Json,
            Some(other) => {
                return Err(ConfigError::invalid(
                    LOG_FORMAT_ENV,
                    format!("expected `json` or `pretty`, got `{other}`"),
                ))
            }
        };

        Ok(Self {
            cluster,
            rpc_url,
            wallet_address,
            auto_connect,
            confirm_poll_interval: Duration::from_millis(confirm_poll_ms),
            request_timeout: Duration::from_secs(request_timeout_secs),
            log_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_positive(raw: Option<String>, name: &'static str) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::invalid(name, "must be greater than zero")),
        Ok(value) => Ok(Some(value)),
        Err(e) => Err(ConfigError::invalid(name, e.to_string())),
    }
}
