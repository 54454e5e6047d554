//! CLI command modules.

pub mod http;
pub mod names;
pub mod write;
