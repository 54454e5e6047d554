//! Seams to the external collaborators.
//!
//! The writer and aggregator never talk to a node directly. Funding,
//! signing, broadcasting and chain sync live behind these traits; the
//! `inscribe-node` crate provides the Bitcoin Core implementation and tests
//! provide in-memory ones.

use std::future::Future;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A built transaction as returned by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionHandle {
    pub txid: String,
    /// Serialized transaction, hex-encoded.
    pub hex: String,
}

/// Broadcast acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub txid: String,
}

/// Builds (funds, signs) a transaction that carries `frame` as auxiliary data.
///
/// Oversized frames and wallet problems come back as errors. The caller
/// never interprets them.
pub trait TransactionBuilder: Send + Sync {
    fn build(
        &self,
        amount: u64,
        frame: &[u8],
    ) -> impl Future<Output = anyhow::Result<TransactionHandle>> + Send;
}

/// Hands a serialized transaction to the network.
pub trait Broadcaster: Send + Sync {
    fn broadcast(&self, tx_hex: &str) -> impl Future<Output = anyhow::Result<Ack>> + Send;
}

// ── Stream source ─────────────────────────────────────────────────────────────

/// Data extracted from one inbound transaction. Not yet known to be ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Transaction id, for diagnostics only.
    pub txid: String,
    /// Embedded data blob. Empty when the transaction carries none.
    pub data: Bytes,
}

impl Candidate {
    pub fn new(txid: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            txid: txid.into(),
            data: data.into(),
        }
    }
}

/// What a stream source pushes: one candidate at a time, or a transport fault.
#[derive(Debug)]
pub enum SourceEvent {
    Candidate(Candidate),
    Error(TransportError),
}

/// A fault in the stream source unrelated to message content.
#[derive(Debug, thiserror::Error)]
#[error("stream source fault: {0:#}")]
pub struct TransportError(pub anyhow::Error);

impl TransportError {
    pub fn new(err: impl Into<anyhow::Error>) -> Self {
        Self(err.into())
    }
}
