// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Terminal Front End
//!
//! Line-oriented front end over the [`Workflow`]. Each line is one command:
//!
//! | Command | Effect |
//! |---------|--------|
//! | `connect` / `disconnect` | Open or close the wallet session |
//! | `balance` | Refresh the balance |
//! | `recipient <address>` | Set the transfer recipient |
//! | `amount <sol>` | Set the transfer amount |
//! | `transfer` | Submit the transfer form |
//! | `airdrop [sol]` | Request faucet credit (sets the amount when given) |
//! | `message <text>` | Set the message to sign |
//! | `sign` | Sign the message |
//! | `status` | Print the view state |
//! | `help` / `quit` | |
//!
//! Operations run as background tasks so the prompt stays responsive; a
//! second submission while one is in flight is rejected by the busy flag.
//! Notifications are printed as they arrive.

use std::str::FromStr;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::blockchain::{Cluster, Pubkey, RpcClient};
use crate::notify::{Level, Notification, Notifier};
use crate::wallet::WalletProvider;
use crate::workflow::{Completed, Field, Outcome, ViewState, Workflow};

pub const HELP: &str = "\
commands:
  connect | disconnect | balance
  recipient <address> | amount <sol> | transfer
  airdrop [sol]
  message <text> | sign
  status | help | quit";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Disconnect,
    Balance,
    Recipient(String),
    Amount(String),
    Transfer,
    Airdrop(Option<String>),
    Message(String),
    Sign,
    Status,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| {
            if rest.is_empty() {
                Err(format!("usage: {verb} <{what}>"))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "connect" => Ok(Command::Connect),
            "disconnect" => Ok(Command::Disconnect),
            "balance" | "refresh" => Ok(Command::Balance),
            "recipient" | "to" => required("address").map(Command::Recipient),
            "amount" => required("sol").map(Command::Amount),
            "transfer" | "send" => Ok(Command::Transfer),
            "airdrop" => Ok(Command::Airdrop((!rest.is_empty()).then(|| rest.to_string()))),
            // Messages keep their inner whitespace.
            "message" | "msg" => required("text").map(Command::Message),
            "sign" => Ok(Command::Sign),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command `{other}` (try `help`)")),
        }
    }
}

/// Render the view state as a short block of text.
pub fn render_view(view: &ViewState, account: Option<Pubkey>, cluster: Cluster) -> String {
    let account = account.map_or_else(|| "(not connected)".to_string(), |a| a.to_string());
    let pending = view
        .pending
        .as_ref()
        .map_or_else(|| "none".to_string(), |op| format!("{} ({})", op.kind, op.id));

    let mut lines = vec![
        format!("cluster:   {cluster}"),
        format!("account:   {account}"),
        format!("balance:   {}", view.balance_display()),
        format!("recipient: {}", view.inputs.recipient),
        format!("amount:    {}", view.inputs.amount),
        format!("airdrop:   {}", view.inputs.airdrop_amount),
        format!("message:   {}", view.inputs.message),
    ];
    if let Some(signature) = view.signature_hex() {
        lines.push(format!("signature: {signature}"));
    }
    lines.push(format!("pending:   {pending}"));
    lines.join("\n")
}

/// One line for a notification.
pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.level {
        Level::Success => "ok",
        Level::Error => "error",
    };
    match &notification.link {
        Some(link) => format!("[{tag}] {} {link}", notification.message),
        None => format!("[{tag}] {}", notification.message),
    }
}

/// One line for an operation outcome.
pub fn render_outcome(outcome: &Outcome) -> String {
    match outcome {
        Ok(Completed::Transferred { signature }) => format!("transfer confirmed: {signature}"),
        Ok(Completed::Credited { signature }) => format!("airdrop confirmed: {signature}"),
        Ok(Completed::Signed { signature_hex }) => format!("signature: {signature_hex}"),
        Err(e) if e.is_caller_rejection() => format!("rejected: {e}"),
        Err(e) => format!("failed ({}): {e}", e.kind()),
    }
}

/// Run the console until `quit`, end of input or `shutdown`.
///
/// In-flight operations are awaited on `quit` and end of input, and
/// aborted on `shutdown`.
pub async fn run<W, R, N, I, O>(
    workflow: Arc<Workflow<W, R, N>>,
    input: I,
    mut output: O,
    mut notifications: UnboundedReceiver<Notification>,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    W: WalletProvider + 'static,
    R: RpcClient + 'static,
    N: Notifier + 'static,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    info!(cluster = %workflow.cluster(), "Console starting");

    let mut lines = input.lines();
    let mut tasks: JoinSet<String> = JoinSet::new();
    let mut input_open = true;

    loop {
        if !input_open && tasks.is_empty() {
            break;
        }

        tokio::select! {
            _ = shutdown.cancelled() => {
                info!(in_flight = tasks.len(), "Console shutting down");
                tasks.abort_all();
                break;
            }
            Some(notification) = notifications.recv() => {
                emit(&mut output, &render_notification(&notification)).await?;
            }
            Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                match joined {
                    Ok(line) => emit(&mut output, &line).await?,
                    Err(e) => warn!(error = %e, "Console task failed"),
                }
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("Console input closed");
                    input_open = false;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(Command::Quit) => input_open = false,
                    Ok(command) => {
                        if let Some(reply) = dispatch(&workflow, command, &mut tasks).await {
                            emit(&mut output, &reply).await?;
                        }
                    }
                    Err(usage) => emit(&mut output, &usage).await?,
                }
            }
        }
    }

    while let Ok(notification) = notifications.try_recv() {
        emit(&mut output, &render_notification(&notification)).await?;
    }
    output.flush().await
}

/// Apply `command`, spawning network work onto `tasks`. Returns an immediate
/// reply, if any.
async fn dispatch<W, R, N>(
    workflow: &Arc<Workflow<W, R, N>>,
    command: Command,
    tasks: &mut JoinSet<String>,
) -> Option<String>
where
    W: WalletProvider + 'static,
    R: RpcClient + 'static,
    N: Notifier + 'static,
{
    let wf = Arc::clone(workflow);
    match command {
        Command::Connect => {
            tasks.spawn(async move {
                match wf.connect().await {
                    Ok(account) => format!("connected: {account}"),
                    Err(e) => format!("connect failed: {e}"),
                }
            });
            None
        }
        Command::Disconnect => {
            wf.disconnect().await;
            Some("disconnected".into())
        }
        Command::Balance => {
            tasks.spawn(async move {
                match wf.refresh_balance().await {
                    Some(balance) => format!("balance: {balance}"),
                    None => format!("balance: {}", crate::workflow::BALANCE_LOADING),
                }
            });
            None
        }
        Command::Recipient(value) => {
            wf.set_input(Field::Recipient, value).await;
            None
        }
        Command::Amount(value) => {
            wf.set_input(Field::Amount, value).await;
            None
        }
        Command::Message(value) => {
            wf.set_input(Field::Message, value).await;
            None
        }
        Command::Transfer => {
            tasks.spawn(async move { render_outcome(&wf.submit_transfer_form().await) });
            None
        }
        Command::Airdrop(amount) => {
            if let Some(amount) = amount {
                wf.set_input(Field::AirdropAmount, amount).await;
            }
            tasks.spawn(async move { render_outcome(&wf.submit_airdrop_form().await) });
            None
        }
        Command::Sign => {
            tasks.spawn(async move { render_outcome(&wf.submit_sign_form().await) });
            None
        }
        Command::Status => Some(render_view(
            &wf.view().await,
            wf.session().account(),
            wf.cluster(),
        )),
        Command::Help => Some(HELP.to_string()),
        Command::Quit => None,
    }
}

async fn emit<O: AsyncWrite + Unpin>(output: &mut O, line: &str) -> std::io::Result<()> {
    output.write_all(line.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::ChannelNotifier;
    use crate::testing::{FakeRpc, FakeWallet, Ledger};
    use crate::wallet::{ConnectionPolicy, WalletSession};
    use crate::workflow::{MSG_SIGN_OK, MSG_TRANSFER_OK};

    const RECIPIENT: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    async fn run_script(script: &str, lamports: u64) -> String {
        let ledger = Ledger::new(lamports);
        let (notifier, rx) = ChannelNotifier::new();
        let workflow = Arc::new(Workflow::new(
            WalletSession::new(FakeWallet::new(ledger.clone()), ConnectionPolicy::default()),
            FakeRpc::new(ledger),
            notifier,
            Cluster::Devnet,
        ));
        workflow.connect().await.unwrap();

        let mut output = Vec::new();
        run(
            workflow,
            script.as_bytes(),
            &mut output,
            rx,
            CancellationToken::new(),
        )
        .await
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("connect".parse::<Command>(), Ok(Command::Connect));
        assert_eq!("  BALANCE ".parse::<Command>(), Ok(Command::Balance));
        assert_eq!(
            "recipient abc".parse::<Command>(),
            Ok(Command::Recipient("abc".into()))
        );
        assert_eq!("airdrop".parse::<Command>(), Ok(Command::Airdrop(None)));
        assert_eq!(
            "airdrop 1.5".parse::<Command>(),
            Ok(Command::Airdrop(Some("1.5".into())))
        );
        assert_eq!(
            "message hello   world".parse::<Command>(),
            Ok(Command::Message("hello   world".into()))
        );
        assert_eq!("exit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_unknown_and_incomplete_commands() {
        assert!("fly".parse::<Command>().unwrap_err().contains("unknown command"));
        assert!("amount".parse::<Command>().unwrap_err().contains("usage"));
        assert!("recipient   ".parse::<Command>().is_err());
    }

    #[test]
    fn renders_view() {
        let view = ViewState::default();
        let text = render_view(&view, None, Cluster::Devnet);
        assert!(text.contains("cluster:   devnet"));
        assert!(text.contains("(not connected)"));
        assert!(text.contains("balance:   Loading..."));
        assert!(text.contains("pending:   none"));
    }

    #[test]
    fn renders_connected_view_with_signature() {
        let account: Pubkey = RECIPIENT.parse().unwrap();
        let view = ViewState {
            balance: Some(crate::blockchain::Balance::from_lamports(1_500_000_000)),
            signature: Some(vec![0xde, 0xad]),
            ..Default::default()
        };
        let text = render_view(&view, Some(account), Cluster::Testnet);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "cluster:   testnet");
        assert_eq!(lines[1], format!("account:   {RECIPIENT}"));
        assert_eq!(lines[2], "balance:   1.5000 SOL");
        assert!(lines.contains(&"signature: dead"));
        assert_eq!(lines.last(), Some(&"pending:   none"));
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn renders_rejections_apart_from_failures() {
        let busy: Outcome = Err(crate::error::WorkflowError::Busy);
        assert!(render_outcome(&busy).starts_with("rejected:"));

        let failed: Outcome = Err(crate::error::WorkflowError::RateLimited("429".into()));
        assert!(render_outcome(&failed).starts_with("failed (rate_limited)"));
    }

    #[tokio::test]
    async fn transfer_script() {
        let script = format!("recipient {RECIPIENT}\namount 1\ntransfer\n");
        let output = run_script(&script, 2_500_000_000).await;

        assert!(output.contains("transfer confirmed:"), "{output}");
        assert!(output.contains(MSG_TRANSFER_OK), "{output}");
    }

    #[tokio::test]
    async fn sign_prints_hex_signature() {
        let output = run_script("message hello\nsign\nquit\n", 0).await;
        assert!(output.contains(&format!("signature: {}", "ab".repeat(64))), "{output}");
        assert!(output.contains(MSG_SIGN_OK), "{output}");
    }

    #[tokio::test]
    async fn validation_rejection_is_printed() {
        let output = run_script("amount 0\nrecipient x\ntransfer\n", 1).await;
        assert!(output.contains("rejected: Invalid input"), "{output}");
    }

    #[tokio::test]
    async fn status_and_help_reply_inline() {
        let output = run_script("status\nhelp\nbogus\n", 1_000_000_000).await;
        assert!(output.contains("balance:   1.0000 SOL"), "{output}");
        assert!(output.contains("commands:"), "{output}");
        assert!(output.contains("unknown command `bogus`"), "{output}");
    }

    #[tokio::test]
    async fn cancelled_console_stops() {
        let ledger = Ledger::new(0);
        let (notifier, rx) = ChannelNotifier::new();
        let workflow = Arc::new(Workflow::new(
            WalletSession::new(FakeWallet::new(ledger.clone()), ConnectionPolicy::default()),
            FakeRpc::new(ledger),
            notifier,
            Cluster::Devnet,
        ));
        let shutdown = CancellationToken::new();
        shutdown.cancel();

        let (_keep_open, input) = tokio::io::duplex(64);
        let mut output = Vec::new();
        run(
            workflow,
            tokio::io::BufReader::new(input),
            &mut output,
            rx,
            shutdown,
        )
        .await
        .unwrap();
    }
}
