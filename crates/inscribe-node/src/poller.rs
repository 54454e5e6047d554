//! Block poller: the stream source.
//!
//! Verifies the checkpoint against the node, then walks every block after
//! it, pushing one candidate per transaction into a bounded channel. When
//! caught up with the tip it sleeps `interval` and asks again.
//!
//! Reorgs are not handled: blocks are read once, in height order.
//! Any RPC failure is pushed as `SourceEvent::Error` and the poller stops.
//! Dropping the receiver unsubscribes; the poller notices on its next send
//! or while idle.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use inscribe_core::ChainCheckpoint;
use inscribe_services::{SourceEvent, TransportError};

use crate::rpc::RpcClient;
use crate::script::{candidate_from_tx, RpcTransaction};

/// Channel capacity between poller and aggregator.
pub const SOURCE_CHANNEL_CAPACITY: usize = 1024;

#[derive(Deserialize)]
struct Block {
    hash: String,
    #[serde(default)]
    tx: Vec<RpcTransaction>,
}

pub struct BlockPoller {
    rpc: RpcClient,
    checkpoint: ChainCheckpoint,
    interval: Duration,
}

impl BlockPoller {
    pub fn new(rpc: RpcClient, checkpoint: ChainCheckpoint, interval: Duration) -> Self {
        Self {
            rpc,
            checkpoint,
            interval,
        }
    }

    /// Start polling on a new task. The receiver is the subscription.
    pub fn spawn(self) -> (mpsc::Receiver<SourceEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(SOURCE_CHANNEL_CAPACITY);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    /// Poll until unsubscribed or a transport fault.
    pub async fn run(self, tx: mpsc::Sender<SourceEvent>) {
        if let Err(e) = self.poll(&tx).await {
            tracing::warn!(error = %format!("{e:#}"), "block poller stopping");
            let _ = tx.send(SourceEvent::Error(TransportError(e))).await;
        }
    }

    async fn poll(&self, tx: &mpsc::Sender<SourceEvent>) -> anyhow::Result<()> {
        self.verify_checkpoint().await?;

        let mut next = self.checkpoint.next_height();
        tracing::info!(
            start_height = next,
            checkpoint = %self.checkpoint.hash_hex(),
            "block poller starting"
        );

        loop {
            let tip: u64 = self
                .rpc
                .call("getblockcount", json!([]))
                .await
                .context("getblockcount")?;

            while next <= tip {
                let block = self.fetch_block(next).await?;
                let count = block.tx.len();
                for raw in &block.tx {
                    let event = SourceEvent::Candidate(candidate_from_tx(raw));
                    if tx.send(event).await.is_err() {
                        tracing::info!("stream unsubscribed");
                        return Ok(());
                    }
                }
                tracing::debug!(height = next, hash = %block.hash, txs = count, "block scanned");
                next += 1;
            }

            tokio::select! {
                _ = tx.closed() => {
                    tracing::info!("stream unsubscribed");
                    return Ok(());
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    async fn verify_checkpoint(&self) -> anyhow::Result<()> {
        let hash: String = self
            .rpc
            .call("getblockhash", json!([self.checkpoint.height]))
            .await
            .with_context(|| format!("checkpoint height {} not found", self.checkpoint.height))?;
        if !self.checkpoint.matches(&hash) {
            anyhow::bail!(
                "checkpoint mismatch at height {}: config has {}, node has {}",
                self.checkpoint.height,
                self.checkpoint.hash_hex(),
                hash
            );
        }
        Ok(())
    }

    async fn fetch_block(&self, height: u64) -> anyhow::Result<Block> {
        let hash: String = self
            .rpc
            .call("getblockhash", json!([height]))
            .await
            .with_context(|| format!("getblockhash {height}"))?;
        self.rpc
            .call("getblock", json!([hash, 2]))
            .await
            .with_context(|| format!("getblock {hash}"))
    }
}
