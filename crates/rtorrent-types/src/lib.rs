//! # rTorrent Types
//!
//! This crate defines the error type, download filters and the accessor trait
//! shared by rTorrent clients.

use std::fmt;

use thiserror::Error;
use url::{Host, Url};

/// Error type for rTorrent operations.
#[derive(Error, Debug)]
pub enum RTorrentError {
    /// The endpoint could not be set up (invalid address, unsupported scheme, ...)
    #[error("connection error: {0}")]
    Connection(String),

    /// Network-related errors (connection failures, timeouts, HTTP status, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// The daemon answered with an XML-RPC fault
    #[error("rpc fault {code}: {message}")]
    Fault {
        /// `faultCode` member of the fault struct.
        code: i64,
        /// `faultString` member of the fault struct.
        message: String,
    },

    /// The response could not be decoded into the expected shape
    #[error("decode error: {0}")]
    Decode(String),

    /// A list response was shorter than the requested index
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Length of the list the daemon returned.
        len: usize,
    },

    /// A value derived from a response could not be parsed
    #[error("parse error: {0}")]
    Parse(String),

    /// The transport could not be released
    #[error("close error: {0}")]
    Close(String),
}

/// Download states understood by rTorrent's `download_list` view filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadState {
    /// Every download, no filter.
    All,
    #[allow(missing_docs)]
    Started,
    #[allow(missing_docs)]
    Stopped,
    #[allow(missing_docs)]
    Complete,
    #[allow(missing_docs)]
    Incomplete,
    #[allow(missing_docs)]
    Hashing,
    #[allow(missing_docs)]
    Seeding,
    #[allow(missing_docs)]
    Leeching,
    #[allow(missing_docs)]
    Active,
}

impl DownloadState {
    /// Every state, in the order rTorrent documents its views.
    pub const ALL: [DownloadState; 9] = [
        DownloadState::All,
        DownloadState::Started,
        DownloadState::Stopped,
        DownloadState::Complete,
        DownloadState::Incomplete,
        DownloadState::Hashing,
        DownloadState::Seeding,
        DownloadState::Leeching,
        DownloadState::Active,
    ];

    /// The view name sent to the daemon, `None` for the unfiltered list.
    pub fn filter(self) -> Option<&'static str> {
        match self {
            DownloadState::All => None,
            DownloadState::Started => Some("started"),
            DownloadState::Stopped => Some("stopped"),
            DownloadState::Complete => Some("complete"),
            DownloadState::Incomplete => Some("incomplete"),
            DownloadState::Hashing => Some("hashing"),
            DownloadState::Seeding => Some("seeding"),
            DownloadState::Leeching => Some("leeching"),
            DownloadState::Active => Some("active"),
        }
    }
}

impl fmt::Display for DownloadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter().unwrap_or("all"))
    }
}

impl std::str::FromStr for DownloadState {
    type Err = RTorrentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DownloadState::ALL
            .into_iter()
            .find(|state| state.to_string() == s)
            .ok_or_else(|| RTorrentError::Parse(format!("unknown download state: {s}")))
    }
}

/// Derive the tracker domain from a tracker URL.
///
/// The port, if any, is not part of the result. Parse failures are returned as
/// [`RTorrentError::Parse`] carrying the parser's message.
pub fn tracker_domain(tracker_url: &str) -> Result<String, RTorrentError> {
    let url = Url::parse(tracker_url).map_err(|e| RTorrentError::Parse(e.to_string()))?;

    // `Url` keeps the port apart from the host, so no host:port split is left to do.
    match url.host() {
        Some(Host::Domain(domain)) => Ok(domain.to_string()),
        Some(Host::Ipv4(ip)) => Ok(ip.to_string()),
        Some(Host::Ipv6(ip)) => Ok(ip.to_string()),
        None => Err(RTorrentError::Parse(format!(
            "tracker URL has no host: {tracker_url}"
        ))),
    }
}

/// RTorrent trait defines the read interface of an rTorrent client.
#[allow(async_fn_in_trait)]
pub trait RTorrent {
    /// Current global download rate in bytes per second.
    async fn down_rate(&self) -> Result<i64, RTorrentError>;
    /// Current global upload rate in bytes per second.
    async fn up_rate(&self) -> Result<i64, RTorrentError>;
    /// Bytes downloaded since the daemon started.
    async fn down_total(&self) -> Result<i64, RTorrentError>;
    /// Bytes uploaded since the daemon started.
    async fn up_total(&self) -> Result<i64, RTorrentError>;
    /// Info-hashes of the downloads in the given state, in daemon order.
    async fn list(&self, state: DownloadState) -> Result<Vec<String>, RTorrentError>;
    /// Base filename shown in the rTorrent UI for a download.
    async fn base_filename(&self, info_hash: &str) -> Result<String, RTorrentError>;
    /// Host of the first tracker of a download, without port.
    async fn tracker_domain(&self, info_hash: &str) -> Result<String, RTorrentError>;
    /// Current download rate of a download in bytes per second.
    async fn download_down_rate(&self, info_hash: &str) -> Result<i64, RTorrentError>;
    /// Current upload rate of a download in bytes per second.
    async fn download_up_rate(&self, info_hash: &str) -> Result<i64, RTorrentError>;
    /// Bytes downloaded for a download.
    async fn download_down_total(&self, info_hash: &str) -> Result<i64, RTorrentError>;
    /// Bytes uploaded for a download.
    async fn download_up_total(&self, info_hash: &str) -> Result<i64, RTorrentError>;
}
