//! # rTorrent client using XML-RPC.
//!
//! usage:
//!
//! ```rust,ignore
//! use rtorrent_client::{Dialect, RTorrentClient};
//! use rtorrent_types::RTorrent;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RTorrentClient::try_new("http://localhost:8000/RPC2", None)?
//!         .with_dialect(Dialect::Modern);
//!     println!("down: {} B/s", client.down_rate().await?);
//!     for hash in client.downloads().seeding().await? {
//!         let name = client.downloads().base_filename(&hash).await?;
//!         let tracker = client.downloads().tracker_domain(&hash).await?;
//!         println!("{hash} {name} ({tracker})");
//!     }
//!     client.close()?;
//!     Ok(())
//! }
//! ```
//!

mod client;
mod conversions;
mod methods;
mod ops;
#[cfg(test)]
mod testutil;
pub mod xmlrpc;

#[cfg(test)]
use {test_log as _, tracing_subscriber as _, wiremock as _};

pub use client::{Downloads, RTorrentClient};
pub use methods::Dialect;
pub use ops::HttpTransport;
