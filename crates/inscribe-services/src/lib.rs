//! inscribe-services: writer, stream aggregator and the collaborator seams
//! they depend on.

pub mod aggregator;
pub mod collaborator;
pub mod name_set;
pub mod writer;

pub use aggregator::{Aggregator, AggregatorStats, DecodeFailure, Ingest, Notification, StatsSnapshot};
pub use collaborator::{
    Ack, Broadcaster, Candidate, SourceEvent, TransactionBuilder, TransactionHandle,
    TransportError,
};
pub use name_set::NameSet;
pub use writer::{PublishOutcome, PublishRequest, WriteOptions, Writer, WriterError};
