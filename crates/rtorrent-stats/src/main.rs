//! # rTorrent statistics
//!
//! ## Usage
//!
//! ```sh,ignore
//! cargo run --release -p rtorrent-stats -- --url http://localhost:8000/RPC2 global
//! cargo run --release -p rtorrent-stats -- list seeding
//! cargo run --release -p rtorrent-stats -- info <info-hash>
//! ```

mod cli;

use std::time::Duration;

use clap::Parser;
use rtorrent_client::{Dialect, RTorrentClient};
use rtorrent_types::RTorrent;
use thiserror as _;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use rtorrent_stats::{DownloadReport, Error, GlobalStats};

use crate::cli::{Cli, Command};

/// Initializes the tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the client described by the command line.
fn connect(cli: &Cli) -> Result<RTorrentClient, Error> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cli.timeout_secs))
        .build()
        .map_err(|e| Error::Transport(e.to_string()))?;

    let dialect = if cli.legacy {
        Dialect::Legacy
    } else {
        Dialect::Modern
    };
    debug!("Using {dialect:?} method names");

    Ok(RTorrentClient::try_new(&cli.url, Some(http))?.with_dialect(dialect))
}

/// Runs one command and prints its result to stdout.
async fn run(client: &RTorrentClient, command: Command) -> Result<(), Error> {
    match command {
        Command::Global => println!("{}", GlobalStats::collect(client).await?),
        Command::List { state } => {
            let hashes = client.list(state).await?;
            info!("{} {state} downloads", hashes.len());
            for hash in hashes {
                println!("{hash}");
            }
        }
        Command::Info { hash } => println!("{}", DownloadReport::collect(client, &hash).await?),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let client = connect(&cli)?;

    // The client is closed even when the command fails.
    let result = run(&client, cli.command).await;
    client.close()?;
    result?;

    Ok(())
}
