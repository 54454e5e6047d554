//! inscribe-core: frame format, names payload, checkpoints and configuration.
//! All other Inscribe crates depend on this one.

pub mod checkpoint;
pub mod config;
pub mod frame;
pub mod names;

pub use checkpoint::{ChainCheckpoint, Checkpoint, Network};
pub use frame::{Frame, FrameError, APP_VERSION};
pub use names::PayloadError;
