//! Shared HTTP request helpers for daemon queries.

use anyhow::{Context, Result};
use serde::Deserialize;

pub fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{}/api", port)
}

/// API URL with `segments` appended, each percent-encoded as one path segment.
pub fn api_url(port: u16, segments: &[&str]) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(&base_url(port)).context("invalid API base URL")?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("API base URL cannot take path segments"))?
        .extend(segments);
    Ok(url)
}

pub async fn get_json<T: for<'de> Deserialize<'de>>(url: &str) -> Result<T> {
    reqwest::get(url)
        .await
        .with_context(|| format!("failed to connect to inscribed at {}; is it running?", url))?
        .json::<T>()
        .await
        .context("failed to parse response")
}
