//! inscribe-ctl: publish names and query the inscribed reader.

mod cmd;

use anyhow::{Context, Result};

use inscribe_core::config::DEFAULT_API_PORT;

fn print_usage() {
    println!("Usage: inscribe-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  write <names...> [--dry-run]   Publish names in a transaction");
    println!("                                 --dry-run prints the signed hex without sending");
    println!("  names                          List names seen by the reader");
    println!("  name <name>                    Check whether a name was seen");
    println!("  status                         Show reader status and counters");
    println!();
    println!("Write options:");
    println!("  --app-config <path>      App config (default: $INSCRIBE_APP_CONFIG or ./app-config.toml)");
    println!("  --client-config <path>   Client config (default: $INSCRIBE_CLIENT_CONFIG or ./client-config.toml)");
    println!();
    println!("Options:");
    println!("  --port <port>   Reader API port (default: {})", DEFAULT_API_PORT);
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    // `write` owns everything after it, names included.
    if args.first().map(String::as_str) == Some("write") {
        let rest: Vec<&str> = args[1..].iter().map(String::as_str).collect();
        let write_args = cmd::write::parse(&rest)?;
        return cmd::write::cmd_write(write_args).await;
    }

    // Parse --port option
    let mut port = DEFAULT_API_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | []                => cmd::names::cmd_status(port).await,
        ["names"]                      => cmd::names::cmd_names(port).await,
        ["name", name]                 => cmd::names::cmd_name(port, name).await,
        ["help"] | ["--help"] | ["-h"] => { print_usage(); Ok(()) }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
