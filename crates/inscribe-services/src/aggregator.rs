//! Stream filter and aggregator.
//!
//! Consumes candidates from a stream source one at a time, in delivery
//! order, and turns them into a deduplicated name set plus notifications:
//!
//! ```text
//! candidate ─► frame decode ─► version filter ─► payload decode ─► name set
//!                  │ empty          │ foreign          │ malformed      │ new
//!                  ▼                ▼                  ▼                ▼
//!               (silent)         (silent)        DecodeFailed        NewName
//! ```
//!
//! Payloads are attacker-controlled. Every failure past the version filter
//! becomes a `DecodeFailed` notification; no input can stop the loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use inscribe_core::frame;
use inscribe_core::names::{self, PayloadError};

use crate::collaborator::{Candidate, SourceEvent, TransportError};
use crate::name_set::NameSet;

// ── Notifications ─────────────────────────────────────────────────────────────

/// Emitted to every subscriber, in the order the records arrived.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A name seen for the first time.
    NewName(String),
    /// A record with our version byte whose payload could not be decoded.
    DecodeFailed(DecodeFailure),
}

#[derive(Debug, Clone)]
pub struct DecodeFailure {
    pub txid: String,
    pub error: Arc<PayloadError>,
}

/// Outcome of one `ingest` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    /// The transaction carried no embedded data.
    NoFrame,
    /// Someone else's frame.
    ForeignVersion(u8),
    /// Our version, undecodable payload. One `DecodeFailed` was emitted.
    Rejected,
    /// Decoded. `new` names were inserted, `duplicate` were already known.
    Accepted { new: usize, duplicate: usize },
}

// ── Stats ─────────────────────────────────────────────────────────────────────

/// Running counters. Written by the aggregator only.
#[derive(Debug, Default)]
pub struct AggregatorStats {
    records: AtomicU64,
    no_frame: AtomicU64,
    foreign_version: AtomicU64,
    decode_failures: AtomicU64,
    new_names: AtomicU64,
    duplicates: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub records: u64,
    pub no_frame: u64,
    pub foreign_version: u64,
    pub decode_failures: u64,
    pub new_names: u64,
    pub duplicates: u64,
}

impl AggregatorStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            no_frame: self.no_frame.load(Ordering::Relaxed),
            foreign_version: self.foreign_version.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            new_names: self.new_names.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

// ── Aggregator ────────────────────────────────────────────────────────────────

pub struct Aggregator {
    version: u8,
    names: NameSet,
    subscribers: Vec<mpsc::UnboundedSender<Notification>>,
    stats: Arc<AggregatorStats>,
}

impl Aggregator {
    /// Create an aggregator accepting frames tagged with `version`.
    pub fn new(version: u8, names: NameSet) -> Self {
        Self {
            version,
            names,
            subscribers: Vec::new(),
            stats: Arc::new(AggregatorStats::default()),
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Read handle on the aggregate set.
    pub fn names(&self) -> NameSet {
        self.names.clone()
    }

    pub fn stats(&self) -> Arc<AggregatorStats> {
        self.stats.clone()
    }

    /// Register a subscriber. Each sees every later notification in order.
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Notification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Process one candidate synchronously.
    pub fn ingest(&mut self, candidate: Candidate) -> Ingest {
        AggregatorStats::bump(&self.stats.records, 1);

        let frame = match frame::decode_bytes(candidate.data) {
            Ok(f) => f,
            Err(_) => {
                AggregatorStats::bump(&self.stats.no_frame, 1);
                return Ingest::NoFrame;
            }
        };

        if frame.version != self.version {
            AggregatorStats::bump(&self.stats.foreign_version, 1);
            tracing::trace!(
                txid = %candidate.txid,
                version = frame.version,
                "ignoring foreign frame"
            );
            return Ingest::ForeignVersion(frame.version);
        }

        let decoded = match names::decode_names(&frame.payload) {
            Ok(n) => n,
            Err(e) => {
                AggregatorStats::bump(&self.stats.decode_failures, 1);
                tracing::debug!(txid = %candidate.txid, error = %e, "payload rejected");
                self.emit(Notification::DecodeFailed(DecodeFailure {
                    txid: candidate.txid,
                    error: Arc::new(e),
                }));
                return Ingest::Rejected;
            }
        };

        let mut new = 0;
        let mut duplicate = 0;
        for name in decoded {
            if self.names.insert(&name) {
                new += 1;
                tracing::debug!(txid = %candidate.txid, name = %name, "new name");
                self.emit(Notification::NewName(name));
            } else {
                duplicate += 1;
            }
        }
        AggregatorStats::bump(&self.stats.new_names, new as u64);
        AggregatorStats::bump(&self.stats.duplicates, duplicate as u64);

        Ingest::Accepted { new, duplicate }
    }

    /// Drive the aggregator from a stream source until it closes.
    ///
    /// Returns `Ok` when the source hangs up and `Err` on the first
    /// transport fault, which is passed through unchanged.
    pub async fn run(
        &mut self,
        mut source: mpsc::Receiver<SourceEvent>,
    ) -> Result<(), TransportError> {
        tracing::info!(version = self.version, "aggregator starting");

        while let Some(event) = source.recv().await {
            match event {
                SourceEvent::Candidate(candidate) => {
                    self.ingest(candidate);
                }
                SourceEvent::Error(e) => {
                    tracing::error!(error = %e, "stream source failed");
                    return Err(e);
                }
            }
        }

        tracing::info!(names = self.names.len(), "stream source closed");
        Ok(())
    }

    fn emit(&mut self, notification: Notification) {
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }
}
