//! # rTorrent statistics reports
//!
//! Collects the global and per-download statistics of a daemon into printable
//! reports. Works with anything implementing [`RTorrent`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use rtorrent_client::RTorrentClient;
//! use rtorrent_stats::GlobalStats;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!    let client = RTorrentClient::try_new("http://localhost:8000/RPC2", None)?;
//!    println!("{}", GlobalStats::collect(&client).await?);
//!    client.close()?;
//!    Ok(())
//! }
//! ```

use std::fmt;

use clap as _;
use dotenvy as _;
use reqwest as _;
use rtorrent_client as _;
use rtorrent_types::{RTorrent, RTorrentError};
use thiserror::Error;
use tokio as _;
use tracing::debug;
use tracing_subscriber as _;

/// Error variants for the statistics tool.
#[derive(Error, Debug)]
pub enum Error {
    /// The HTTP transport could not be built from the configuration.
    #[error("failed to build HTTP transport: {0}")]
    Transport(String),

    /// A query against the daemon failed.
    #[error(transparent)]
    RTorrent(#[from] RTorrentError),
}

/// Global transfer statistics of the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalStats {
    /// Current download rate in bytes per second.
    pub down_rate: i64,
    /// Current upload rate in bytes per second.
    pub up_rate: i64,
    /// Bytes downloaded since the daemon started.
    pub down_total: i64,
    /// Bytes uploaded since the daemon started.
    pub up_total: i64,
}

impl GlobalStats {
    /// Query the four global counters, one call each.
    pub async fn collect<C: RTorrent>(client: &C) -> Result<Self, RTorrentError> {
        debug!("Collecting global statistics");
        Ok(Self {
            down_rate: client.down_rate().await?,
            up_rate: client.up_rate().await?,
            down_total: client.down_total().await?,
            up_total: client.up_total().await?,
        })
    }
}

impl fmt::Display for GlobalStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "down: {}/s ({} total)",
            format_bytes(self.down_rate),
            format_bytes(self.down_total)
        )?;
        write!(
            f,
            "up:   {}/s ({} total)",
            format_bytes(self.up_rate),
            format_bytes(self.up_total)
        )
    }
}

/// Statistics of a single download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Info-hash of the download.
    pub info_hash: String,
    /// Base filename shown in the rTorrent UI.
    pub name: String,
    /// Host of the first tracker.
    pub tracker: String,
    /// Current download rate in bytes per second.
    pub down_rate: i64,
    /// Current upload rate in bytes per second.
    pub up_rate: i64,
    /// Bytes downloaded.
    pub down_total: i64,
    /// Bytes uploaded.
    pub up_total: i64,
}

impl DownloadReport {
    /// Query every per-download accessor for `info_hash`.
    pub async fn collect<C: RTorrent>(client: &C, info_hash: &str) -> Result<Self, RTorrentError> {
        debug!("Collecting statistics for {info_hash}");
        Ok(Self {
            info_hash: info_hash.to_string(),
            name: client.base_filename(info_hash).await?,
            tracker: client.tracker_domain(info_hash).await?,
            down_rate: client.download_down_rate(info_hash).await?,
            up_rate: client.download_up_rate(info_hash).await?,
            down_total: client.download_down_total(info_hash).await?,
            up_total: client.download_up_total(info_hash).await?,
        })
    }
}

impl fmt::Display for DownloadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.info_hash, self.name)?;
        writeln!(f, "tracker: {}", self.tracker)?;
        writeln!(
            f,
            "down: {}/s ({} total)",
            format_bytes(self.down_rate),
            format_bytes(self.down_total)
        )?;
        write!(
            f,
            "up:   {}/s ({} total)",
            format_bytes(self.up_rate),
            format_bytes(self.up_total)
        )
    }
}

/// Render a byte count with a binary unit, e.g. `1.5 KiB`.
pub fn format_bytes(bytes: i64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes.abs() < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value.abs() < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}
