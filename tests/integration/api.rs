//! Read-only HTTP API over a populated aggregate.

use std::time::Instant;

use serde_json::Value;

use crate::*;
use inscribe_api::{router, ApiState};
use inscribe_core::frame::{self, APP_VERSION};
use inscribe_core::names::encode_names_frame;
use inscribe_core::Network;
use inscribe_services::{Aggregator, NameSet};

async fn serve_populated() -> String {
    serve_frames(vec![
        encode_names_frame(APP_VERSION, &["zed", "alice"]),
        encode_names_frame(APP_VERSION, &["alice"]),
        frame::encode(APP_VERSION, b"{}"),
    ])
    .await
}

async fn serve_frames(frames: Vec<Vec<u8>>) -> String {
    let mut agg = Aggregator::new(APP_VERSION, NameSet::new());
    agg.run(source_of(frames)).await.unwrap();

    let state = ApiState {
        names: agg.names(),
        stats: agg.stats(),
        network: Network::Regtest,
        version: agg.version(),
        checkpoint_height: 0,
        started_at: Instant::now(),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}/api")
}

async fn get(url: String) -> Value {
    let resp = reqwest::get(url).await.unwrap();
    assert!(resp.status().is_success());
    resp.json().await.unwrap()
}

#[tokio::test]
async fn test_names_endpoint_lists_sorted_set() {
    let base = serve_populated().await;

    let body = get(format!("{base}/names")).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["names"], serde_json::json!(["alice", "zed"]));
}

#[tokio::test]
async fn test_name_lookup() {
    let base = serve_populated().await;

    let seen = get(format!("{base}/names/alice")).await;
    assert_eq!(seen["name"], "alice");
    assert_eq!(seen["seen"], true);

    let unseen = get(format!("{base}/names/bob")).await;
    assert_eq!(unseen["seen"], false);
}

#[tokio::test]
async fn test_status_reports_counters() {
    let base = serve_populated().await;

    let status = get(format!("{base}/status")).await;
    assert_eq!(status["network"], "regtest");
    assert_eq!(status["version"], 0);
    assert_eq!(status["names"], 2);
    assert_eq!(status["stats"]["records"], 3);
    assert_eq!(status["stats"]["decode_failures"], 1);
    assert_eq!(status["stats"]["duplicates"], 1);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let base = serve_populated().await;

    let resp = reqwest::get(format!("{base}/blocks")).await.unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_name_lookup_with_reserved_characters() {
    let names = ["a/b", "x?y", "p#q", "50%"];
    let base = serve_frames(vec![encode_names_frame(APP_VERSION, &names)]).await;

    for name in names {
        let mut url = reqwest::Url::parse(&base).unwrap();
        url.path_segments_mut().unwrap().push("names").push(name);

        let body = get(url.to_string()).await;
        assert_eq!(body["name"], name);
        assert_eq!(body["seen"], true, "{name} via {url}");
    }
}
