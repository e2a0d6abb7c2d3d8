//! HTTP client for the Project Rome server listing
//!
//! The listing endpoint returns summary records for every BFBC2 server;
//! the player list of a single server lives under `{base}/{LID}/{GID}`.
//! Requests are spaced by a client-side rate limiter.

use async_trait::async_trait;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT},
    Client,
};
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::time::Duration;

use super::ServerListApi;
use crate::models::{ServerDetails, ServerRecord};
use crate::utils::error::FetchError;

/// Default listing endpoint
pub const DEFAULT_BASE_URL: &str = "https://fesl.cetteup.com/v1/bfbc2/servers/rome-pc";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const DEFAULT_REQUESTS_PER_SECOND: u32 = 5;

/// Project Rome listing client
pub struct RomeClient {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Listing endpoint, without trailing slash
    base_url: String,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl RomeClient {
    /// Create a client for the public listing endpoint
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transient` if the HTTP client cannot be created
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Create a client for a custom endpoint (mirrors, mock servers)
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transient` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Self::with_config(base_url, timeout, DEFAULT_REQUESTS_PER_SECOND)
    }

    /// Create a client with full control over rate limiting
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Transient` if the HTTP client cannot be created
    pub fn with_config(
        base_url: &str,
        timeout: Duration,
        requests_per_second: u32,
    ) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("bfbc2-monitor/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .default_headers(headers)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        })
    }

    /// Listing endpoint in use
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = status.as_u16(), "Upstream returned error status");
            return Err(FetchError::status(status.as_u16(), url));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(FetchError::decode)
    }
}

#[async_trait]
impl ServerListApi for RomeClient {
    async fn list_servers(&self) -> Result<Vec<ServerRecord>, FetchError> {
        let servers: Vec<ServerRecord> = self.get_json(&self.base_url).await?;
        tracing::debug!(count = servers.len(), "Retrieved server listing");
        Ok(servers)
    }

    async fn server_details(&self, record: &ServerRecord) -> Result<ServerDetails, FetchError> {
        let path = record.details_path().ok_or_else(|| {
            FetchError::transient(format!("Listing entry '{}' has no LID/GID", record.name))
        })?;

        let url = format!("{}/{path}", self.base_url);
        self.get_json(&url).await
    }
}
