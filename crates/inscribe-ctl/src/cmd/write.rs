//! `write`: publish names in a transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};

use inscribe_core::config::{AppConfig, ClientConfig};
use inscribe_node::{RpcClient, RpcTransactionBuilder};
use inscribe_services::{PublishOutcome, PublishRequest, Writer};

pub struct WriteArgs {
    pub names: Vec<String>,
    pub dry_run: bool,
    pub app_config: Option<PathBuf>,
    pub client_config: Option<PathBuf>,
}

/// Split `write` arguments into names and flags. `--` ends flag parsing.
pub fn parse(args: &[&str]) -> Result<WriteArgs> {
    let mut parsed = WriteArgs {
        names: Vec::new(),
        dry_run: false,
        app_config: None,
        client_config: None,
    };
    let mut i = 0;
    let mut flags_done = false;
    while i < args.len() {
        let arg = args[i];
        if flags_done {
            parsed.names.push(arg.to_string());
        } else {
            match arg {
                "--" => flags_done = true,
                "--dry-run" => parsed.dry_run = true,
                "--app-config" => {
                    i += 1;
                    let path = args.get(i).context("--app-config requires a path")?;
                    parsed.app_config = Some(PathBuf::from(*path));
                }
                "--client-config" => {
                    i += 1;
                    let path = args.get(i).context("--client-config requires a path")?;
                    parsed.client_config = Some(PathBuf::from(*path));
                }
                flag if flag.starts_with("--") => anyhow::bail!("unknown flag: {flag}"),
                name => parsed.names.push(name.to_string()),
            }
        }
        i += 1;
    }
    if parsed.names.is_empty() {
        anyhow::bail!("write requires at least one name");
    }
    Ok(parsed)
}

pub async fn cmd_write(args: WriteArgs) -> Result<()> {
    let outcome = publish(args).await?;
    print!("{}", render(&outcome));
    Ok(())
}

/// Load config, then build and (unless dry run) broadcast the write.
async fn publish(args: WriteArgs) -> Result<PublishOutcome> {
    let app = match &args.app_config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    }
    .context("failed to load app config")?;
    let client = match &args.client_config {
        Some(path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .context("failed to load client config")?;

    let rpc = RpcClient::from_config(&app, &client).context("failed to set up node RPC")?;
    let builder = RpcTransactionBuilder::from_config(rpc, &app, &client);
    let writer = Writer::new(builder.clone(), builder);

    let request = PublishRequest {
        names: args.names,
        version: app.version,
        amount: client.amount,
        dry_run: args.dry_run,
    };
    Ok(writer.publish(&request).await?)
}

fn render(outcome: &PublishOutcome) -> String {
    match outcome {
        PublishOutcome::DryRun { tx } => format!("tx hex {}\nnot sending\n", tx.hex),
        PublishOutcome::Broadcast { ack, .. } => {
            format!("write submitted successfully\n  txid : {}\n", ack.txid)
        }
    }
}
