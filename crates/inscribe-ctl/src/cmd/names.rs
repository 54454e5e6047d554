//! Daemon query commands: `names`, `name <n>`, `status`.

use anyhow::Result;
use serde::Deserialize;

use super::http::{api_url, base_url, get_json};

#[derive(Deserialize)]
struct NamesResponse {
    count: usize,
    names: Vec<String>,
}

#[derive(Deserialize)]
struct NameResponse {
    name: String,
    seen: bool,
}

#[derive(Deserialize)]
struct StatusResponse {
    network: String,
    version: u8,
    checkpoint_height: u64,
    uptime_secs: u64,
    names: usize,
    stats: Stats,
}

#[derive(Deserialize)]
struct Stats {
    records: u64,
    no_frame: u64,
    foreign_version: u64,
    decode_failures: u64,
    new_names: u64,
    duplicates: u64,
}

pub async fn cmd_names(port: u16) -> Result<()> {
    let resp: NamesResponse = get_json(&format!("{}/names", base_url(port))).await?;

    if resp.names.is_empty() {
        println!("No names observed yet.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Names ({})", resp.count);
    println!("═══════════════════════════════════════");
    for name in &resp.names {
        println!("  {}", name);
    }

    Ok(())
}

pub async fn cmd_name(port: u16, name: &str) -> Result<()> {
    let url = api_url(port, &["names", name])?;
    let resp: NameResponse = get_json(url.as_str()).await?;
    if resp.seen {
        println!("{}: seen", resp.name);
    } else {
        println!("{}: not seen", resp.name);
    }
    Ok(())
}

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Inscribe Reader Status");
    println!("═══════════════════════════════════════");
    println!("  Network          : {}", resp.network);
    println!("  Version byte     : 0x{:02x}", resp.version);
    println!("  Checkpoint       : {}", resp.checkpoint_height);
    println!("  Uptime           : {}s", resp.uptime_secs);
    println!("  Names            : {}", resp.names);
    println!();
    println!("  Records scanned  : {}", resp.stats.records);
    println!("  ├─ no data       : {}", resp.stats.no_frame);
    println!("  ├─ foreign       : {}", resp.stats.foreign_version);
    println!("  ├─ malformed     : {}", resp.stats.decode_failures);
    println!("  ├─ new names     : {}", resp.stats.new_names);
    println!("  └─ duplicates    : {}", resp.stats.duplicates);

    Ok(())
}
