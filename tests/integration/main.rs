//! Inscribe integration test harness.
//!
//! Everything runs in-process: stream sources are plain channels, and the
//! node is a mock Bitcoin Core JSON-RPC server bound to 127.0.0.1:0.
//!
//!   cargo test --test integration

use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use inscribe_node::script::op_return_script;
use inscribe_services::{Candidate, Notification, SourceEvent};

mod api;
mod scenarios;

// ── Stream harness ────────────────────────────────────────────────────────────

/// A closed source that delivers `frames` in order, one candidate each.
pub fn source_of(frames: Vec<Vec<u8>>) -> mpsc::Receiver<SourceEvent> {
    let (tx, rx) = mpsc::channel(frames.len().max(1));
    for (i, data) in frames.into_iter().enumerate() {
        tx.try_send(SourceEvent::Candidate(Candidate::new(format!("{i:064x}"), data)))
            .expect("channel sized for all frames");
    }
    rx
}

/// Everything currently queued on a subscriber.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Notification>) -> Vec<Notification> {
    let mut out = Vec::new();
    while let Ok(n) = rx.try_recv() {
        out.push(n);
    }
    out
}

pub fn new_names(notifications: &[Notification]) -> Vec<String> {
    notifications
        .iter()
        .filter_map(|n| match n {
            Notification::NewName(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

pub fn error_count(notifications: &[Notification]) -> usize {
    notifications
        .iter()
        .filter(|n| matches!(n, Notification::DecodeFailed(_)))
        .count()
}

// ── Mock node ─────────────────────────────────────────────────────────────────

pub const MOCK_TXID: &str = "cdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcdcd";

/// Regtest genesis hash, used as block 0 of every mock chain.
pub const GENESIS_HASH: &str = "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206";

/// A block: one entry per transaction, `None` for a transaction without data.
pub type MockBlock = Vec<Option<Vec<u8>>>;

#[derive(Clone, Default)]
pub struct MockNode {
    blocks: Arc<Mutex<Vec<(String, Value)>>>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_funding: bool,
}

impl MockNode {
    /// A chain with the genesis block followed by `blocks`.
    pub fn with_blocks(blocks: Vec<MockBlock>) -> Self {
        let node = Self::default();
        node.push_block(Vec::new());
        for block in blocks {
            node.push_block(block);
        }
        node
    }

    pub fn push_block(&self, txs: MockBlock) {
        let mut blocks = self.blocks.lock().unwrap();
        let height = blocks.len();
        let hash = if height == 0 {
            GENESIS_HASH.to_string()
        } else {
            format!("{height:064x}")
        };
        let tx: Vec<Value> = txs
            .into_iter()
            .enumerate()
            .map(|(i, data)| {
                let mut vout = vec![json!({ "value": 0.5, "scriptPubKey": { "hex": "0014aabbccdd" } })];
                if let Some(data) = data {
                    vout.push(json!({
                        "value": 0.0,
                        "scriptPubKey": { "hex": hex::encode(op_return_script(&data)) }
                    }));
                }
                json!({ "txid": format!("{height:032x}{i:032x}"), "vout": vout })
            })
            .collect();
        let block = json!({ "hash": hash, "height": height, "tx": tx });
        blocks.push((hash, block));
    }

    pub fn called(&self, method: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|m| m == method)
    }

    fn dispatch(&self, method: &str, params: &Value) -> Result<Value, (i64, String)> {
        self.calls.lock().unwrap().push(method.to_string());
        let blocks = self.blocks.lock().unwrap();
        match method {
            "getblockcount" => Ok(json!(blocks.len() - 1)),
            "getblockhash" => {
                let height = params[0].as_u64().unwrap_or(u64::MAX) as usize;
                blocks
                    .get(height)
                    .map(|(hash, _)| json!(hash))
                    .ok_or((-8, "Block height out of range".to_string()))
            }
            "getblock" => {
                let hash = params[0].as_str().unwrap_or_default();
                blocks
                    .iter()
                    .find(|(h, _)| h == hash)
                    .map(|(_, block)| block.clone())
                    .ok_or((-5, "Block not found".to_string()))
            }
            "getrawchangeaddress" => Ok(json!("bcrt1qchange")),
            "createrawtransaction" => {
                let data = params[1][0]["data"].as_str().unwrap_or_default();
                let script = hex::encode(op_return_script(&hex::decode(data).unwrap_or_default()));
                Ok(json!(format!("0200000000{script}")))
            }
            "fundrawtransaction" if self.fail_funding => Err((-4, "Insufficient funds".to_string())),
            "fundrawtransaction" => {
                let raw = params[0].as_str().unwrap_or_default();
                Ok(json!({ "hex": format!("{raw}f0"), "fee": 0.0001, "changepos": 1 }))
            }
            "signrawtransactionwithwallet" => {
                let raw = params[0].as_str().unwrap_or_default();
                Ok(json!({ "hex": format!("{raw}5151"), "complete": true }))
            }
            "decoderawtransaction" => Ok(json!({ "txid": MOCK_TXID })),
            "sendrawtransaction" => Ok(json!(MOCK_TXID)),
            other => Err((-32601, format!("Method not found: {other}"))),
        }
    }
}

async fn handle_rpc(State(node): State<MockNode>, Json(req): Json<Value>) -> (StatusCode, Json<Value>) {
    let method = req["method"].as_str().unwrap_or_default().to_string();
    match node.dispatch(&method, &req["params"]) {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({ "result": result, "error": null, "id": req["id"] })),
        ),
        Err((code, message)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "result": null, "error": { "code": code, "message": message }, "id": req["id"] })),
        ),
    }
}

/// Serve `node` on an ephemeral port. Returns the base URL.
pub async fn spawn_mock_node(node: MockNode) -> String {
    let app = Router::new()
        .route("/", post(handle_rpc))
        .route("/wallet/{name}", post(handle_rpc))
        .with_state(node);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}
