//! Configuration system for Inscribe.
//!
//! Two files, both loaded once at process start and immutable afterwards:
//!
//! * app config: what every participant of the application shares
//!   (network, checkpoint, version byte)
//! * client config: how this machine reaches its node and wallet
//!
//! Resolution order per file: explicit path → `$INSCRIBE_APP_CONFIG` /
//! `$INSCRIBE_CLIENT_CONFIG` → `./app-config.toml` / `./client-config.toml`
//! → `./app-config.json` / `./client-config.json` → defaults. `INSCRIBE_*`
//! environment overrides are applied last; unparseable values are ignored.
//!
//! Files ending in `.json` are parsed as JSON, anything else as TOML.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::checkpoint::{Checkpoint, Network};
use crate::frame::APP_VERSION;

pub const APP_CONFIG_ENV: &str = "INSCRIBE_APP_CONFIG";
pub const CLIENT_CONFIG_ENV: &str = "INSCRIBE_CLIENT_CONFIG";

/// Default amount moved through a write, in satoshis.
pub const DEFAULT_AMOUNT_SAT: u64 = 10_000;

/// Default port for the reader daemon's HTTP API.
pub const DEFAULT_API_PORT: u16 = 9101;

// ── App config ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Network the application lives on.
    #[serde(alias = "networkName")]
    pub network_name: Network,
    /// Block to start scanning after. Genesis of `network_name` when absent.
    pub checkpoint: Option<Checkpoint>,
    /// Version byte that marks this application's frames.
    pub version: u8,
    /// Optional address that receives the written amount.
    #[serde(alias = "payTo")]
    pub pay_to: Option<String>,
    /// Seconds between polls once the reader has caught up with the tip.
    pub poll_interval_secs: u64,
    /// Port for the reader daemon's HTTP API.
    pub api_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network_name: Network::default(),
            checkpoint: None,
            version: APP_VERSION,
            pay_to: None,
            poll_interval_secs: 10,
            api_port: DEFAULT_API_PORT,
        }
    }
}

impl AppConfig {
    /// Load: env path → `./app-config.toml` → defaults, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            load_file(&path)?
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config: AppConfig = load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn file_path() -> PathBuf {
        resolve_path(env_var(APP_CONFIG_ENV), Path::new(""), "app-config")
    }

    /// Configured checkpoint, or the network's genesis block.
    pub fn checkpoint(&self) -> Checkpoint {
        self.checkpoint
            .clone()
            .unwrap_or_else(|| self.network_name.genesis_checkpoint())
    }

    /// Apply INSCRIBE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(env_var);
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(n) = var("INSCRIBE_NETWORK").and_then(|v| Network::from_name(&v)) {
            self.network_name = n;
        }
        if let Some(p) = var("INSCRIBE_API_PORT").and_then(|v| v.parse().ok()) {
            self.api_port = p;
        }
    }
}

// ── Client config ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Node JSON-RPC endpoint. Empty = localhost on the network's default port.
    #[serde(alias = "rpcUrl")]
    pub rpc_url: String,
    #[serde(alias = "rpcUser")]
    pub rpc_user: Option<String>,
    #[serde(alias = "rpcPassword")]
    pub rpc_password: Option<String>,
    /// Bitcoin Core `.cookie` file. Used when no user/password is given.
    #[serde(alias = "cookieFile")]
    pub cookie_file: Option<PathBuf>,
    /// Wallet to fund and sign with. None = the node's default wallet.
    pub wallet: Option<String>,
    /// Amount moved through each write, in satoshis.
    pub amount: u64,
    /// Fee rate in sat/vB passed to the node's funding call. None = node estimate.
    #[serde(alias = "feeRate")]
    pub fee_rate: Option<f64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: String::new(),
            rpc_user: None,
            rpc_password: None,
            cookie_file: None,
            wallet: None,
            amount: DEFAULT_AMOUNT_SAT,
            fee_rate: None,
        }
    }
}

impl ClientConfig {
    /// Load: env path → `./client-config.toml` → defaults, then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            load_file(&path)?
        } else {
            ClientConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config: ClientConfig = load_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn file_path() -> PathBuf {
        resolve_path(env_var(CLIENT_CONFIG_ENV), Path::new(""), "client-config")
    }

    /// RPC endpoint, falling back to localhost on the network's default port.
    pub fn rpc_url_for(&self, network: Network) -> String {
        if self.rpc_url.is_empty() {
            format!("http://127.0.0.1:{}", network.default_rpc_port())
        } else {
            self.rpc_url.trim_end_matches('/').to_string()
        }
    }

    /// Credentials for HTTP basic auth: explicit user/password, else cookie file.
    pub fn credentials(&self) -> Result<Option<(String, String)>, ConfigError> {
        if let Some(user) = &self.rpc_user {
            return Ok(Some((
                user.clone(),
                self.rpc_password.clone().unwrap_or_default(),
            )));
        }
        let Some(path) = &self.cookie_file else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
        match text.trim().split_once(':') {
            Some((user, pass)) => Ok(Some((user.to_string(), pass.to_string()))),
            None => Err(ConfigError::MalformedCookie(path.clone())),
        }
    }

    /// Apply INSCRIBE_* env var overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(env_var);
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(v) = var("INSCRIBE_RPC_URL") {
            self.rpc_url = v;
        }
        if let Some(v) = var("INSCRIBE_RPC_USER") {
            self.rpc_user = Some(v);
        }
        if let Some(v) = var("INSCRIBE_RPC_PASSWORD") {
            self.rpc_password = Some(v);
        }
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// `explicit` if set, else `<dir>/<stem>.toml`, else `<dir>/<stem>.json`
/// when only the JSON file exists.
fn resolve_path(explicit: Option<String>, dir: &Path, stem: &str) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }
    let toml_path = dir.join(format!("{stem}.toml"));
    let json_path = dir.join(format!("{stem}.json"));
    if !toml_path.exists() && json_path.exists() {
        json_path
    } else {
        toml_path
    }
}

fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
    parse_str(path, &text)
}

fn parse_str<T: DeserializeOwned>(path: &Path, text: &str) -> Result<T, ConfigError> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(text).map_err(|e| ConfigError::ParseJsonFailed(path.to_path_buf(), e))
    } else {
        toml::from_str(text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to parse {0}: {1}")]
    ParseJsonFailed(PathBuf, serde_json::Error),
    #[error("cookie file {0} is not in user:password form")]
    MalformedCookie(PathBuf),
}
