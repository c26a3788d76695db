//! HTTP transport for the route ticks API.
//!
//! `PageTransport` is the seam between the fetcher and the network: it
//! performs exactly one GET and hands back the status and body untouched.
//! Retry, backoff and parsing decisions all live in the fetcher.

use std::future::Future;

use reqwest::{header, Client, StatusCode};
use tracing::debug;

use crate::config::SyncConfig;

use super::ApiError;

/// Status and body of one HTTP response.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub status: StatusCode,
    pub body: String,
}

impl RawPage {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
        }
    }

    pub fn status(status: StatusCode) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// One GET per call. Transport failures (timeouts, refused connections)
/// surface as `ApiError::Network`; every HTTP status comes back as a `RawPage`.
pub trait PageTransport {
    fn get_page(&self, url: &str) -> impl Future<Output = Result<RawPage, ApiError>> + Send;
}

/// reqwest-backed transport.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct TickClient {
    client: Client,
}

impl TickClient {
    pub fn new(config: &SyncConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("tickcache/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

impl PageTransport for TickClient {
    async fn get_page(&self, url: &str) -> Result<RawPage, ApiError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        debug!(url = url, status = %status, "Ticks response received");

        let body = response.text().await?;
        Ok(RawPage { status, body })
    }
}
