// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use solnet_wallet::blockchain::SolanaRpcClient;
use solnet_wallet::config::{Config, LogFormat, DEFAULT_LOG_FILTER};
use solnet_wallet::console;
use solnet_wallet::notify::ChannelNotifier;
use solnet_wallet::wallet::{ConnectionPolicy, WalletSession, WatchOnlyWallet};
use solnet_wallet::workflow::Workflow;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout belongs to the console.
    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };

    init_tracing(config.log_format);

    let rpc = match SolanaRpcClient::from_config(&config) {
        Ok(rpc) => rpc,
        Err(e) => {
            error!(error = %e, "Failed to create RPC client");
            std::process::exit(1);
        }
    };

    info!(
        cluster = %config.cluster,
        rpc_url = %config.rpc_url,
        watch_address = ?config.wallet_address.map(|a| a.to_string()),
        "Solnet wallet starting"
    );

    let (notifier, notifications) = ChannelNotifier::new();
    let session = WalletSession::new(
        WatchOnlyWallet::new(config.wallet_address),
        ConnectionPolicy {
            auto_connect: config.auto_connect,
        },
    );
    let workflow = Arc::new(Workflow::new(session, rpc, notifier, config.cluster));

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for Ctrl-C");
                return;
            }
            info!("Ctrl-C received, shutting down");
            shutdown.cancel();
        });
    }

    if workflow.session().policy().auto_connect && config.wallet_address.is_some() {
        // Failures are reported as a notification.
        let _ = workflow.connect().await;
    }

    println!("{}", console::HELP);
    println!("note: {}", WatchOnlyWallet::LIMITATION);

    let stdin = BufReader::new(tokio::io::stdin());
    if let Err(e) = console::run(
        workflow,
        stdin,
        tokio::io::stdout(),
        notifications,
        shutdown,
    )
    .await
    {
        error!(error = %e, "Console I/O failed");
        std::process::exit(1);
    }

    info!("Solnet wallet stopped");
    // A pending stdin read would otherwise keep the runtime alive.
    std::process::exit(0);
}
