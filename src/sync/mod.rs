//! Poll cycle scheduling
//!
//! The [`SyncEngine`] is the only place where the monitored server is fetched
//! for the live message and where the [`MessageManager`] is driven. Commands
//! never touch either directly: they enqueue requests through a cloneable
//! [`SyncHandle`], and the engine folds them into its single timeline.
//!
//! [`MessageManager`]: crate::message::MessageManager

mod engine;

pub use engine::SyncEngine;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Notify, RwLock};

use crate::message::ChannelId;

/// Phase of the poll cycle state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum SyncPhase {
    #[default]
    Idle,
    Fetching,
    Rendering,
    Committing,
    /// Waiting out a backoff delay after a failed cycle
    Backoff,
    /// Engine loop has exited
    Stopped,
}

/// Observable engine state
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,

    /// Cycles run so far, successful or not
    pub cycles: u64,

    /// Consecutive failed cycles
    pub consecutive_failures: u32,

    /// When the last cycle reached the platform successfully
    pub last_success: Option<DateTime<Utc>>,
}

/// Pending requests from outside the engine
///
/// A flag plus a wakeup instead of a queue: any number of requests made
/// while a cycle is running collapse into one follow-up cycle.
#[derive(Debug, Default)]
pub(crate) struct Triggers {
    wakeup: Notify,
    refresh_requested: AtomicBool,
    pending_channel: Mutex<Option<ChannelId>>,
}

impl Triggers {
    fn request_refresh(&self) {
        self.refresh_requested.store(true, Ordering::SeqCst);
        self.wakeup.notify_one();
    }

    fn set_channel(&self, channel: ChannelId) {
        *self
            .pending_channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(channel);
        self.request_refresh();
    }

    fn refresh_pending(&self) -> bool {
        self.refresh_requested.load(Ordering::SeqCst)
    }

    fn channel_pending(&self) -> Option<ChannelId> {
        *self
            .pending_channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Consume the refresh flag
    pub(crate) fn take_refresh(&self) -> bool {
        self.refresh_requested.swap(false, Ordering::SeqCst)
    }

    /// Consume the pending channel change
    pub(crate) fn take_channel(&self) -> Option<ChannelId> {
        self.pending_channel
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    pub(crate) async fn notified(&self) {
        self.wakeup.notified().await;
    }
}

/// Cloneable handle for requesting work from a running [`SyncEngine`]
#[derive(Debug, Clone)]
pub struct SyncHandle {
    triggers: Arc<Triggers>,
    status: Arc<RwLock<SyncStatus>>,
}

impl SyncHandle {
    pub(crate) fn new(triggers: Arc<Triggers>, status: Arc<RwLock<SyncStatus>>) -> Self {
        Self { triggers, status }
    }

    /// Ask for a cycle now
    ///
    /// Bypasses the timer wait and any backoff delay but leaves the periodic
    /// schedule untouched. Requests made while a cycle is running coalesce
    /// into a single follow-up cycle.
    pub fn request_refresh(&self) {
        tracing::debug!("Manual refresh requested");
        self.triggers.request_refresh();
    }

    /// Retarget the live message to `channel` and refresh
    ///
    /// The change is applied by the engine right before its next cycle.
    pub fn set_channel(&self, channel: ChannelId) {
        tracing::debug!(channel_id = %channel, "Channel change requested");
        self.triggers.set_channel(channel);
    }

    /// Whether a refresh has been requested but not yet picked up
    pub fn refresh_pending(&self) -> bool {
        self.triggers.refresh_pending()
    }

    /// Channel change waiting for the next cycle
    pub fn channel_pending(&self) -> Option<ChannelId> {
        self.triggers.channel_pending()
    }

    /// Current engine state
    pub async fn status(&self) -> SyncStatus {
        self.status.read().await.clone()
    }
}
