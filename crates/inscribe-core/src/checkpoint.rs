//! Chain checkpoints and network selection.
//!
//! A checkpoint is the block the reader trusts without scanning. The stream
//! source verifies it against the node and starts at the following block.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Bitcoin network the node is running on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[serde(alias = "livenet", alias = "bitcoin", alias = "main")]
    Mainnet,
    #[default]
    #[serde(alias = "test")]
    Testnet,
    Signet,
    Regtest,
}

impl Network {
    /// Default JSON-RPC port of Bitcoin Core on this network.
    pub fn default_rpc_port(self) -> u16 {
        match self {
            Network::Mainnet => 8332,
            Network::Testnet => 18332,
            Network::Signet => 38332,
            Network::Regtest => 18443,
        }
    }

    /// Genesis block of this network. Used when no checkpoint is configured.
    pub fn genesis_checkpoint(self) -> Checkpoint {
        let hash = match self {
            Network::Mainnet => "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
            Network::Testnet => "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943",
            Network::Signet => "00000008819873e925422c1ff0f99f7cc9bbb232af63a077a480a3633bee1ef6",
            Network::Regtest => "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206",
        };
        Checkpoint {
            height: 0,
            hash: hash.to_string(),
        }
    }

    /// Parse a network name, accepting the same aliases as config files.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" | "livenet" | "bitcoin" | "main" => Some(Network::Mainnet),
            "testnet" | "test" => Some(Network::Testnet),
            "signet" => Some(Network::Signet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Signet => "signet",
            Network::Regtest => "regtest",
        };
        f.write_str(name)
    }
}

/// Checkpoint as written in the app config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Height of the checkpoint block.
    pub height: u64,
    /// Block hash in the usual big-endian display hex.
    pub hash: String,
}

/// A validated checkpoint handed to the stream source at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainCheckpoint {
    pub height: u64,
    /// Block hash in display byte order.
    pub hash: [u8; 32],
}

impl ChainCheckpoint {
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// First height the stream source scans.
    pub fn next_height(&self) -> u64 {
        self.height.saturating_add(1)
    }

    /// Compare against a hash returned by the node.
    pub fn matches(&self, node_hash: &str) -> bool {
        hex::decode(node_hash.trim())
            .map(|bytes| bytes == self.hash)
            .unwrap_or(false)
    }
}

impl Checkpoint {
    /// Validate the descriptor and convert it to the form the node adapter takes.
    pub fn resolve(&self) -> Result<ChainCheckpoint, CheckpointError> {
        if self.height == u64::MAX {
            return Err(CheckpointError::HeightOutOfRange);
        }
        let trimmed = self.hash.trim();
        if trimmed.len() != 64 {
            return Err(CheckpointError::HashLength(trimmed.len()));
        }
        let bytes = hex::decode(trimmed).map_err(CheckpointError::HashHex)?;
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&bytes);
        Ok(ChainCheckpoint {
            height: self.height,
            hash,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint hash must be 64 hex characters, got {0}")]
    HashLength(usize),
    #[error("checkpoint hash is not hex: {0}")]
    HashHex(#[source] hex::FromHexError),
    #[error("checkpoint height leaves no block to scan after it")]
    HeightOutOfRange,
}
