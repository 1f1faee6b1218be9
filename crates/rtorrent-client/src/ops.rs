//! Internal trait abstracting the XML-RPC transport.
//!
//! This module provides the [`XmlRpcOps`] trait which abstracts the underlying
//! HTTP transport, enabling mocking in tests, and [`HttpTransport`], the reqwest
//! implementation used by default.

use reqwest::header::CONTENT_TYPE;
use tracing::debug;
use url::Url;

use crate::xmlrpc::{Value, XmlRpcError, decode_response, encode_call};

/// Internal trait that abstracts a single XML-RPC endpoint.
/// This allows for mocking in tests.
#[cfg_attr(test, mockall::automock)]
#[allow(async_fn_in_trait)]
pub(crate) trait XmlRpcOps {
    /// Perform one remote call and return the decoded response value.
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, XmlRpcError>;
    /// Release the transport's resources.
    fn close(&self) -> Result<(), XmlRpcError>;
}

/// XML-RPC over HTTP, one `POST` per call.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
}

impl HttpTransport {
    pub(crate) fn new(url: Url, http: reqwest::Client) -> Self {
        Self { http, url }
    }

    /// The endpoint this transport posts to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl XmlRpcOps for HttpTransport {
    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, XmlRpcError> {
        let body = encode_call(method, &params);
        let response = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(XmlRpcError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        decode_response(&bytes)
    }

    fn close(&self) -> Result<(), XmlRpcError> {
        // reqwest has no explicit shutdown; the pool goes away with the last clone.
        debug!("Releasing HTTP transport for {}", self.url);
        Ok(())
    }
}
