//! export::client
//!
//! Outbound transport for export records.
//!
//! # Design
//!
//! [`StatsSink`] is async because sending involves network I/O. The
//! pipeline depends only on the trait; [`HttpSink`] posts JSON to the
//! collector and [`MockSink`](super::mock::MockSink) records payloads for
//! tests.
//!
//! There is no retry. A timeout, a connection failure or a non-success
//! status is reported once as a [`SendError`] and the match is dropped.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

use super::schema::ExportRecord;

/// Path the collector accepts match exports on.
pub const COLLECTOR_PATH: &str = "/among-data";

/// Hard timeout for one send.
pub const SEND_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent header value for outbound requests.
const USER_AGENT_VALUE: &str = concat!("TownOfUs-StatsExporter/", env!("CARGO_PKG_VERSION"));

/// Errors from sending an export.
#[derive(Debug, Clone, Error)]
pub enum SendError {
    /// Connection or transport error.
    #[error("network error: {0}")]
    Network(String),

    /// The collector did not answer within the send timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The collector answered with a non-success status.
    #[error("collector returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The record could not be encoded.
    #[error("failed to encode export: {0}")]
    Serialize(String),
}

/// Acknowledgement of a successful send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// HTTP status code
    pub status: u16,
    /// Response body, possibly empty
    pub body: String,
}

/// Destination for export records.
#[async_trait]
pub trait StatsSink: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send one record.
    async fn send(&self, record: &ExportRecord) -> Result<SendReceipt, SendError>;
}

/// Normalize a configured endpoint to the collector URL.
///
/// One trailing `/` is removed, then [`COLLECTOR_PATH`] is appended unless
/// the endpoint already ends with it (case-insensitive).
///
/// # Example
///
/// ```
/// use tou_stats_exporter::export::client::normalize_endpoint;
///
/// assert_eq!(normalize_endpoint("https://x.io/"), "https://x.io/among-data");
/// assert_eq!(normalize_endpoint("https://x.io/Among-Data"), "https://x.io/Among-Data");
/// ```
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.strip_suffix('/').unwrap_or(endpoint);
    if trimmed.to_ascii_lowercase().ends_with(COLLECTOR_PATH) {
        trimmed.to_string()
    } else {
        format!("{}{}", trimmed, COLLECTOR_PATH)
    }
}

/// Sink that posts JSON to the stats collector.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpSink {
    /// Create a sink for a configured endpoint.
    ///
    /// The endpoint is normalized with [`normalize_endpoint`].
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            url: normalize_endpoint(endpoint),
            timeout: SEND_TIMEOUT,
        }
    }

    /// Override the send timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collector URL requests are posted to.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    fn map_transport(&self, e: reqwest::Error) -> SendError {
        if e.is_timeout() {
            SendError::Timeout(self.timeout)
        } else {
            SendError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl StatsSink for HttpSink {
    fn name(&self) -> &str {
        "http"
    }

    async fn send(&self, record: &ExportRecord) -> Result<SendReceipt, SendError> {
        let body = serde_json::to_vec(record).map_err(|e| SendError::Serialize(e.to_string()))?;
        debug!(url = %self.url, bytes = body.len(), "posting export");

        let response = self
            .client
            .post(&self.url)
            .headers(Self::headers())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| self.map_transport(e))?;

        if status.is_success() {
            info!(status = status.as_u16(), "collector accepted export");
            Ok(SendReceipt {
                status: status.as_u16(),
                body: text,
            })
        } else {
            Err(SendError::Status {
                status: status.as_u16(),
                body: text,
            })
        }
    }
}
