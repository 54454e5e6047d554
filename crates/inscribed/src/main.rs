//! inscribed: watches the chain and collects published names.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use inscribe_core::config::{AppConfig, ClientConfig};
use inscribe_node::{BlockPoller, RpcClient};
use inscribe_services::{Aggregator, NameSet, Notification};

struct Args {
    app_config: Option<PathBuf>,
    client_config: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        app_config: None,
        client_config: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--app-config" => {
                parsed.app_config = Some(args.next().context("--app-config requires a path")?.into())
            }
            "--client-config" => {
                parsed.client_config =
                    Some(args.next().context("--client-config requires a path")?.into())
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }
    Ok(parsed)
}

/// Print names as they arrive; log rejected payloads.
async fn print_notifications(mut rx: mpsc::UnboundedReceiver<Notification>) {
    while let Some(notification) = rx.recv().await {
        match notification {
            Notification::NewName(name) => {
                tracing::info!(name = %name, "name observed");
                println!("{name}");
            }
            Notification::DecodeFailed(failure) => {
                tracing::warn!(
                    txid = %failure.txid,
                    error = %failure.error,
                    "rejected malformed payload"
                );
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;

    // Load config
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

    let checkpoint = app
        .checkpoint()
        .resolve()
        .context("invalid checkpoint in app config")?;
    tracing::info!(
        network = %app.network_name,
        version = app.version,
        checkpoint_height = checkpoint.height,
        "inscribed starting"
    );

    let rpc = RpcClient::from_config(&app, &client).context("failed to set up node RPC")?;
    tracing::info!(url = rpc.url(), "node rpc endpoint");

    // Aggregator
    let names = NameSet::new();
    let mut aggregator = Aggregator::new(app.version, names.clone());
    let notifications = aggregator.subscribe();
    let stats = aggregator.stats();

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Spawn tasks ──────────────────────────────────────────────────────────

    let poller = BlockPoller::new(
        rpc,
        checkpoint,
        Duration::from_secs(app.poll_interval_secs.max(1)),
    );
    let (source, poller_task) = poller.spawn();

    let aggregator_task = tokio::spawn(async move { aggregator.run(source).await });

    let printer_task = tokio::spawn(print_notifications(notifications));

    let api_task = {
        let state = inscribe_api::ApiState {
            names,
            stats,
            network: app.network_name,
            version: app.version,
            checkpoint_height: checkpoint.height,
            started_at: Instant::now(),
        };
        tokio::spawn(inscribe_api::serve(state, app.api_port))
    };

    // ── Wait for exit ────────────────────────────────────────────────────────

    let result = tokio::select! {
        _ = shutdown_rx.recv() => {
            tracing::info!("shutting down");
            Ok(())
        }
        r = aggregator_task => match r {
            Ok(Ok(())) => {
                tracing::info!("stream source closed");
                Ok(())
            }
            Ok(Err(e)) => Err(anyhow::Error::new(e)),
            Err(e) => Err(anyhow::Error::new(e).context("aggregator task panicked")),
        },
        r = api_task => match r {
            Ok(Ok(())) => Err(anyhow::anyhow!("api server exited")),
            Ok(Err(e)) => Err(e.context("api server failed")),
            Err(e) => Err(anyhow::Error::new(e).context("api task panicked")),
        },
    };

    poller_task.abort();
    printer_task.abort();
    result
}
