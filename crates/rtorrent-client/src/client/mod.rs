//! rTorrent XML-RPC client implementation.

use tracing::debug;
use url::Url;

use rtorrent_types::{DownloadState, RTorrent, RTorrentError};

use crate::conversions::{into_int, into_string, into_string_at, into_string_list};
use crate::methods::{DOWNLOAD_LIST, Dialect, TRACKER_MULTICALL};
use crate::ops::{HttpTransport, XmlRpcOps};
use crate::xmlrpc::{Value, XmlRpcError};


/// RTorrentClient queries an rTorrent daemon over XML-RPC.
#[allow(missing_debug_implementations, private_bounds)]
pub struct RTorrentClient<T: XmlRpcOps = HttpTransport> {
    client: T,
    dialect: Dialect,
}

impl RTorrentClient {
    /// Create a new RTorrentClient for the XML-RPC endpoint at `rpc_url`.
    ///
    /// `transport` overrides the HTTP client, e.g. to set timeouts or a proxy.
    /// If None is provided, a default reqwest client is built. Unreachable hosts
    /// are only reported by the first call.
    pub fn try_new(
        rpc_url: &str,
        transport: Option<reqwest::Client>,
    ) -> Result<Self, RTorrentError> {
        let url = Url::parse(rpc_url)
            .map_err(|e| RTorrentError::Connection(format!("Invalid RPC URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(RTorrentError::Connection(format!(
                "Unsupported RPC URL scheme: {}",
                url.scheme()
            )));
        }

        let http = match transport {
            Some(http) => http,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| RTorrentError::Connection(e.to_string()))?,
        };

        debug!("Connecting to rTorrent XML-RPC at {}", url);
        Ok(Self {
            client: HttpTransport::new(url, http),
            dialect: Dialect::default(),
        })
    }
}

#[allow(private_bounds)]
impl<T: XmlRpcOps> RTorrentClient<T> {
    /// Create a RTorrentClient with a custom transport implementation.
    /// This is primarily useful for testing with mocks.
    #[cfg(test)]
    pub(crate) fn with_client(client: T) -> Self {
        Self {
            client,
            dialect: Dialect::default(),
        }
    }

    /// Select the method-name dialect spoken by the daemon.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// The method-name dialect in use.
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Accessors for individual downloads and download lists.
    pub fn downloads(&self) -> Downloads<'_, T> {
        Downloads { client: self }
    }

    /// Release the transport. The client cannot be used afterwards.
    pub fn close(self) -> Result<(), RTorrentError> {
        debug!("Closing rTorrent client");
        self.client
            .close()
            .map_err(|e| RTorrentError::Close(e.to_string()))
    }

    /// Call `method` with zero or one string argument and decode an integer.
    /// An empty argument is not sent.
    pub(crate) async fn get_int(
        &self,
        method: &str,
        arg: Option<&str>,
    ) -> Result<i64, RTorrentError> {
        into_int(self.call(method, single_param(arg)).await?)
    }

    /// Call `method` with zero or one string argument and decode a string.
    pub(crate) async fn get_string(
        &self,
        method: &str,
        arg: Option<&str>,
    ) -> Result<String, RTorrentError> {
        into_string(self.call(method, single_param(arg)).await?)
    }

    /// Call `method` with `args` and pick the string at `index` of the list response.
    pub(crate) async fn get_string_at(
        &self,
        method: &str,
        args: &[&str],
        index: usize,
    ) -> Result<String, RTorrentError> {
        let params = args.iter().map(|a| Value::from(*a)).collect();
        into_string_at(self.call(method, params).await?, index)
    }

    /// Call `method` with an empty-string placeholder target followed by `args`,
    /// and decode a list of strings.
    pub(crate) async fn get_string_list(
        &self,
        method: &str,
        args: &[&str],
    ) -> Result<Vec<String>, RTorrentError> {
        let params = std::iter::once("")
            .chain(args.iter().copied())
            .map(Value::from)
            .collect();
        into_string_list(self.call(method, params).await?)
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, RTorrentError> {
        debug!("Calling {method} with {params:?}");
        let value = self
            .client
            .call(method, params)
            .await
            .map_err(map_client_error)?;
        debug!("{method} returned {value:?}");
        Ok(value)
    }
}

fn single_param(arg: Option<&str>) -> Vec<Value> {
    arg.filter(|a| !a.is_empty())
        .map(Value::from)
        .into_iter()
        .collect()
}

/// Downloads groups the accessors that address the daemon's downloads.
#[allow(missing_debug_implementations, private_bounds)]
pub struct Downloads<'a, T: XmlRpcOps = HttpTransport> {
    client: &'a RTorrentClient<T>,
}

#[allow(private_bounds)]
impl<T: XmlRpcOps> Downloads<'_, T> {
    /// Info-hashes of the downloads in `state`, in the order the daemon returns them.
    pub async fn list(&self, state: DownloadState) -> Result<Vec<String>, RTorrentError> {
        debug!("Listing {state} downloads");
        let args: Vec<&str> = state.filter().into_iter().collect();
        self.client.get_string_list(DOWNLOAD_LIST, &args).await
    }

    /// All downloads.
    pub async fn all(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::All).await
    }

    /// Started downloads.
    pub async fn started(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Started).await
    }

    /// Stopped downloads.
    pub async fn stopped(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Stopped).await
    }

    /// Complete downloads.
    pub async fn complete(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Complete).await
    }

    /// Incomplete downloads.
    pub async fn incomplete(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Incomplete).await
    }

    /// Downloads being hash-checked.
    pub async fn hashing(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Hashing).await
    }

    /// Seeding downloads.
    pub async fn seeding(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Seeding).await
    }

    /// Leeching downloads.
    pub async fn leeching(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Leeching).await
    }

    /// Active downloads.
    pub async fn active(&self) -> Result<Vec<String>, RTorrentError> {
        self.list(DownloadState::Active).await
    }

    /// Base filename shown in the rTorrent UI for the download `info_hash`.
    pub async fn base_filename(&self, info_hash: &str) -> Result<String, RTorrentError> {
        let method = self.client.dialect.methods().base_filename;
        self.client.get_string(method, Some(info_hash)).await
    }

    /// Host of the first tracker of the download `info_hash`, without port.
    pub async fn tracker_domain(&self, info_hash: &str) -> Result<String, RTorrentError> {
        let command = self.client.dialect.methods().tracker_url;
        let tracker_url = self
            .client
            .get_string_at(TRACKER_MULTICALL, &[info_hash, "", command], 0)
            .await?;
        debug!("First tracker of {info_hash} is {tracker_url}");
        rtorrent_types::tracker_domain(&tracker_url)
    }

    /// Current download rate of `info_hash` in bytes per second.
    pub async fn down_rate(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        let method = self.client.dialect.methods().down_rate;
        self.client.get_int(method, Some(info_hash)).await
    }

    /// Bytes downloaded for `info_hash`.
    pub async fn down_total(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        let method = self.client.dialect.methods().down_total;
        self.client.get_int(method, Some(info_hash)).await
    }

    /// Current upload rate of `info_hash` in bytes per second.
    pub async fn up_rate(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        let method = self.client.dialect.methods().up_rate;
        self.client.get_int(method, Some(info_hash)).await
    }

    /// Bytes uploaded for `info_hash`.
    pub async fn up_total(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        let method = self.client.dialect.methods().up_total;
        self.client.get_int(method, Some(info_hash)).await
    }
}

#[allow(private_bounds)]
impl<T: XmlRpcOps> RTorrent for RTorrentClient<T> {
    async fn down_rate(&self) -> Result<i64, RTorrentError> {
        self.get_int(self.dialect.methods().global_down_rate, None).await
    }

    async fn up_rate(&self) -> Result<i64, RTorrentError> {
        self.get_int(self.dialect.methods().global_up_rate, None).await
    }

    async fn down_total(&self) -> Result<i64, RTorrentError> {
        self.get_int(self.dialect.methods().global_down_total, None).await
    }

    async fn up_total(&self) -> Result<i64, RTorrentError> {
        self.get_int(self.dialect.methods().global_up_total, None).await
    }

    async fn list(&self, state: DownloadState) -> Result<Vec<String>, RTorrentError> {
        self.downloads().list(state).await
    }

    async fn base_filename(&self, info_hash: &str) -> Result<String, RTorrentError> {
        self.downloads().base_filename(info_hash).await
    }

    async fn tracker_domain(&self, info_hash: &str) -> Result<String, RTorrentError> {
        self.downloads().tracker_domain(info_hash).await
    }

    async fn download_down_rate(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        self.downloads().down_rate(info_hash).await
    }

    async fn download_up_rate(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        self.downloads().up_rate(info_hash).await
    }

    async fn download_down_total(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        self.downloads().down_total(info_hash).await
    }

    async fn download_up_total(&self, info_hash: &str) -> Result<i64, RTorrentError> {
        self.downloads().up_total(info_hash).await
    }
}

/// Maps transport errors to rTorrent errors.
fn map_client_error(err: XmlRpcError) -> RTorrentError {
    match err {
        XmlRpcError::Http(e) => RTorrentError::Network(e.to_string()),
        XmlRpcError::Status(status) => RTorrentError::Network(format!("HTTP status {status}")),
        XmlRpcError::Fault { code, message } => RTorrentError::Fault { code, message },
        XmlRpcError::Malformed(msg) => RTorrentError::Decode(msg),
    }
}
