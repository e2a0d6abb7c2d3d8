//! Server status fetching
//!
//! This module turns the upstream server listing into a
//! [`ServerStatusSnapshot`] for the monitored server:
//!
//! - [`ServerListApi`] is the seam to the upstream listing service
//! - [`RomeClient`] implements it over HTTP
//! - [`StatusFetcher`] selects the monitored server and builds the snapshot
//! - [`ListingStats`] summarizes a whole listing for the `overview` command
//!
//! A server that is missing from the listing is a valid observation and
//! yields an offline snapshot. Only transport and decoding problems are
//! errors, and those are always [`FetchError::Transient`].

pub mod client;
pub mod stats;

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::models::{ServerDetails, ServerRecord, ServerStatusSnapshot};
use crate::utils::error::FetchError;

pub use client::RomeClient;
pub use stats::ListingStats;

/// Upstream server listing service
#[async_trait]
pub trait ServerListApi: Send + Sync {
    /// Fetch every listed server, in upstream order
    async fn list_servers(&self) -> Result<Vec<ServerRecord>, FetchError>;

    /// Fetch the detailed record (including players) for one listed server
    async fn server_details(&self, record: &ServerRecord) -> Result<ServerDetails, FetchError>;
}

#[async_trait]
impl<T: ServerListApi + ?Sized> ServerListApi for Arc<T> {
    async fn list_servers(&self) -> Result<Vec<ServerRecord>, FetchError> {
        (**self).list_servers().await
    }

    async fn server_details(&self, record: &ServerRecord) -> Result<ServerDetails, FetchError> {
        (**self).server_details(record).await
    }
}

/// Anything that can observe the monitored server
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self, pattern: &str) -> Result<ServerStatusSnapshot, FetchError>;
}

#[async_trait]
impl<T: StatusSource + ?Sized> StatusSource for Arc<T> {
    async fn fetch(&self, pattern: &str) -> Result<ServerStatusSnapshot, FetchError> {
        (**self).fetch(pattern).await
    }
}

/// Pick the first listed server whose name contains `pattern`, ignoring case
///
/// When several entries match, the first one in upstream order wins.
pub fn select_server<'a>(servers: &'a [ServerRecord], pattern: &str) -> Option<&'a ServerRecord> {
    servers.iter().find(|server| server.matches(pattern))
}

/// Builds snapshots of the monitored server from the upstream listing
pub struct StatusFetcher<A> {
    api: A,
}

impl<A: ServerListApi> StatusFetcher<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    /// Access the underlying listing service
    pub fn api(&self) -> &A {
        &self.api
    }
}

#[async_trait]
impl<A: ServerListApi> StatusSource for StatusFetcher<A> {
    async fn fetch(&self, pattern: &str) -> Result<ServerStatusSnapshot, FetchError> {
        let servers = self.api.list_servers().await?;

        let Some(record) = select_server(&servers, pattern) else {
            tracing::debug!(
                pattern = %pattern,
                listed = servers.len(),
                "Server not found in listing"
            );
            return Ok(ServerStatusSnapshot::offline(Utc::now()));
        };

        let details = self.api.server_details(record).await?;
        let players = details.player_names();

        tracing::debug!(
            server = %record.name,
            players = players.len(),
            "Fetched server status"
        );

        Ok(ServerStatusSnapshot::online(record, players, Utc::now()))
    }
}
