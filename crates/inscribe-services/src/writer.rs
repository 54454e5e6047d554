//! Writer: frames names and hands them to the transaction builder.
//!
//! `make` only builds. `send` is the single call with an external side
//! effect; a dry run is simply a `make` that is never followed by `send`.

use serde::{Deserialize, Serialize};

use inscribe_core::names;

use crate::collaborator::{Ack, Broadcaster, TransactionBuilder, TransactionHandle};

/// Options for `make`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteOptions {
    /// Value moved through the transaction, in satoshis.
    pub amount: u64,
    /// Frame bytes, hex-encoded.
    pub message: String,
}

/// A complete write: names in, transaction out.
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub names: Vec<String>,
    pub version: u8,
    pub amount: u64,
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Built, not broadcast.
    DryRun { tx: TransactionHandle },
    /// Built and accepted by the broadcaster.
    Broadcast { tx: TransactionHandle, ack: Ack },
}

impl PublishOutcome {
    pub fn tx(&self) -> &TransactionHandle {
        match self {
            PublishOutcome::DryRun { tx } | PublishOutcome::Broadcast { tx, .. } => tx,
        }
    }
}

pub struct Writer<B, C> {
    builder: B,
    broadcaster: C,
}

impl<B: TransactionBuilder, C: Broadcaster> Writer<B, C> {
    pub fn new(builder: B, broadcaster: C) -> Self {
        Self {
            builder,
            broadcaster,
        }
    }

    /// Build a transaction embedding `options.message`.
    pub async fn make(&self, options: &WriteOptions) -> Result<TransactionHandle, WriterError> {
        let frame = hex::decode(&options.message).map_err(WriterError::InvalidMessage)?;
        let tx = self
            .builder
            .build(options.amount, &frame)
            .await
            .map_err(WriterError::Build)?;
        tracing::info!(
            txid = %tx.txid,
            frame_bytes = frame.len(),
            amount = options.amount,
            "transaction built"
        );
        Ok(tx)
    }

    /// Broadcast a serialized transaction.
    pub async fn send(&self, tx_hex: &str) -> Result<Ack, WriterError> {
        let ack = self
            .broadcaster
            .broadcast(tx_hex)
            .await
            .map_err(WriterError::Broadcast)?;
        tracing::info!(txid = %ack.txid, "transaction broadcast");
        Ok(ack)
    }

    /// Frame the names, build, and broadcast unless this is a dry run.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome, WriterError> {
        let frame = names::names_frame(request.version, &request.names);
        let options = WriteOptions {
            amount: request.amount,
            message: frame.to_hex(),
        };

        let tx = self.make(&options).await?;
        if request.dry_run {
            tracing::debug!(txid = %tx.txid, "dry run, not sending");
            return Ok(PublishOutcome::DryRun { tx });
        }

        let ack = self.send(&tx.hex).await?;
        Ok(PublishOutcome::Broadcast { tx, ack })
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum WriterError {
    #[error("message is not valid hex: {0}")]
    InvalidMessage(#[source] hex::FromHexError),

    #[error("transaction build failed: {0:#}")]
    Build(anyhow::Error),

    #[error("broadcast failed: {0:#}")]
    Broadcast(anyhow::Error),
}
