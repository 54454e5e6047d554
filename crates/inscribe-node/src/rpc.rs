//! Minimal Bitcoin Core JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use inscribe_core::config::{AppConfig, ClientConfig, ConfigError};

#[derive(Serialize)]
struct Request<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcFault>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcFault {
    pub code: i64,
    pub message: String,
}

/// Cheap to clone; clones share the HTTP connection pool.
#[derive(Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    node_url: String,
    wallet_url: String,
    auth: Option<(String, String)>,
    next_id: Arc<AtomicU64>,
}

impl RpcClient {
    /// `wallet` selects `/wallet/<name>` for wallet calls.
    pub fn new(url: &str, wallet: Option<&str>, auth: Option<(String, String)>) -> Self {
        let node_url = url.trim_end_matches('/').to_string();
        let wallet_url = match wallet {
            Some(name) => format!("{node_url}/wallet/{name}"),
            None => node_url.clone(),
        };
        Self {
            http: reqwest::Client::new(),
            node_url,
            wallet_url,
            auth,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn from_config(app: &AppConfig, client: &ClientConfig) -> Result<Self, RpcError> {
        let auth = client.credentials()?;
        Ok(Self::new(
            &client.rpc_url_for(app.network_name),
            client.wallet.as_deref(),
            auth,
        ))
    }

    pub fn url(&self) -> &str {
        &self.node_url
    }

    /// Node-level call (chain queries, broadcast).
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        self.request(&self.node_url, method, params).await
    }

    /// Wallet-scoped call (funding, signing).
    pub async fn wallet_call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        self.request(&self.wallet_url, method, params).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        method: &str,
        params: Value,
    ) -> Result<T, RpcError> {
        let body = Request {
            jsonrpc: "1.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let mut req = self.http.post(url).json(&body);
        if let Some((user, pass)) = &self.auth {
            req = req.basic_auth(user, Some(pass));
        }

        tracing::trace!(method, url, "rpc call");
        let resp = req.send().await.map_err(RpcError::Http)?;
        let status = resp.status();
        // Bitcoin Core reports RPC faults with a 500 and a JSON body, so the
        // body is read before the status is judged.
        let text = resp.text().await.map_err(RpcError::Http)?;
        let parsed: Response = match serde_json::from_str(&text) {
            Ok(r) => r,
            Err(_) => return Err(RpcError::Status(status.as_u16())),
        };

        if let Some(fault) = parsed.error {
            return Err(RpcError::Rpc {
                method: method.to_string(),
                code: fault.code,
                message: fault.message,
            });
        }
        let result = parsed
            .result
            .ok_or_else(|| RpcError::MissingResult(method.to_string()))?;
        serde_json::from_value(result).map_err(|e| RpcError::Decode(method.to_string(), e))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("rpc transport failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("rpc endpoint answered HTTP {0} without a JSON-RPC body")]
    Status(u16),

    #[error("{method} failed ({code}): {message}")]
    Rpc {
        method: String,
        code: i64,
        message: String,
    },

    #[error("{0} returned no result")]
    MissingResult(String),

    #[error("{0} returned an unexpected result: {1}")]
    Decode(String, #[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
