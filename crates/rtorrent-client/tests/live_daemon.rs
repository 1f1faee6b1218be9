//! Smoke test against a real rTorrent daemon.
//! Requires a running rTorrent with an XML-RPC endpoint and environment configuration:
//! - RTORRENT_RPC_URL (default: http://127.0.0.1:8000/RPC2)
//! - RTORRENT_LEGACY (set to any value for daemons older than 0.9)
//!
//! Run with `cargo test -- --ignored`.

#![allow(unused_crate_dependencies)]

use std::env;

use rtorrent_client::{Dialect, RTorrentClient};
use rtorrent_types::{DownloadState, RTorrent};

fn rpc_url() -> String {
    env::var("RTORRENT_RPC_URL").unwrap_or_else(|_| "http://127.0.0.1:8000/RPC2".into())
}

fn dialect() -> Dialect {
    if env::var_os("RTORRENT_LEGACY").is_some() {
        Dialect::Legacy
    } else {
        Dialect::Modern
    }
}

#[ignore = "requires a running rTorrent daemon"]
#[test_log::test(tokio::test)]
async fn rtorrent_daemon_read_flow() {
    let client = RTorrentClient::try_new(&rpc_url(), None)
        .expect("failed to initialize RTorrentClient")
        .with_dialect(dialect());

    // 1. Global statistics are non-negative counters
    assert!(client.down_rate().await.expect("failed to read down rate") >= 0);
    assert!(client.up_total().await.expect("failed to read up total") >= 0);

    // 2. Every filtered view is a subset of the full list
    let all = client.list(DownloadState::All).await.expect("failed to list");
    for state in DownloadState::ALL {
        let hashes = client.list(state).await.expect("failed to list by state");
        assert!(hashes.iter().all(|h| all.contains(h)), "{state} not in all");
    }

    // 3. Per-download accessors answer for the first download, if any
    if let Some(hash) = all.first() {
        let downloads = client.downloads();
        let name = downloads
            .base_filename(hash)
            .await
            .expect("failed to read base filename");
        assert!(!name.is_empty());
        assert!(downloads.down_total(hash).await.expect("failed to read total") >= 0);
    }

    client.close().expect("failed to close client");
}
