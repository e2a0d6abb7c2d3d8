//! bfbc2-monitor - live Discord status for a Battlefield: Bad Company 2 server
//!
//! The bot polls the public BFBC2 server listing, finds the configured server
//! and keeps a single Discord message edited in place with its map, mode and
//! players.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`fetcher`] - Upstream listing client and snapshot building
//! - [`catalog`] - Map, game mode and region names
//! - [`models`] - Snapshots and upstream wire records
//! - [`render`] - Pure rendering into platform-neutral documents
//! - [`message`] - Live message lifecycle
//! - [`sync`] - Poll cycle scheduling, backoff and trigger coalescing
//! - [`commands`] - Chat command routing
//! - [`shutdown`] - Graceful shutdown
//! - [`discord`] - serenity-backed platform adapter
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use bfbc2_monitor::config::Config;
//! use bfbc2_monitor::fetcher::{RomeClient, StatusFetcher, StatusSource};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let client = RomeClient::new(config.request_timeout())?;
//!     let snapshot = StatusFetcher::new(client)
//!         .fetch(&config.monitor.server_name)
//!         .await?;
//!     println!("{} players online", snapshot.player_count());
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod discord;
pub mod error;
pub mod fetcher;
pub mod message;
pub mod models;
pub mod render;
pub mod shutdown;
pub mod sync;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, MonitorErrorTrait, Result};
    pub use crate::fetcher::{StatusFetcher, StatusSource};
    pub use crate::message::{ChannelId, MessageId, MessageManager, MessageSink};
    pub use crate::models::ServerStatusSnapshot;
    pub use crate::render::{RenderableDocument, StatusRenderer};
    pub use crate::sync::{SyncEngine, SyncHandle};
}

// Direct re-exports for convenience
pub use models::ServerStatusSnapshot;
