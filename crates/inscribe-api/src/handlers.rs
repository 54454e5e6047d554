//! HTTP API handlers: exposes the aggregate set as JSON. Read-only.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use inscribe_core::Network;
use inscribe_services::{AggregatorStats, NameSet, StatsSnapshot};

#[derive(Clone)]
pub struct ApiState {
    pub names: NameSet,
    pub stats: Arc<AggregatorStats>,
    pub network: Network,
    pub version: u8,
    pub checkpoint_height: u64,
    pub started_at: Instant,
}

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub network: String,
    pub version: u8,
    pub checkpoint_height: u64,
    pub uptime_secs: u64,
    pub names: usize,
    pub stats: StatsSnapshot,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        network: state.network.to_string(),
        version: state.version,
        checkpoint_height: state.checkpoint_height,
        uptime_secs: state.started_at.elapsed().as_secs(),
        names: state.names.len(),
        stats: state.stats.snapshot(),
    })
}

// ── /names ───────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct NamesResponse {
    pub count: usize,
    pub names: Vec<String>,
}

pub async fn handle_names(State(state): State<ApiState>) -> Json<NamesResponse> {
    let names = state.names.snapshot();
    Json(NamesResponse {
        count: names.len(),
        names,
    })
}

#[derive(Serialize)]
pub struct NameResponse {
    pub name: String,
    pub seen: bool,
}

pub async fn handle_name(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Json<NameResponse> {
    let seen = state.names.contains(&name);
    Json(NameResponse { name, seen })
}
