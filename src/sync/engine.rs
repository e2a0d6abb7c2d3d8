//! The fetch, render and commit loop

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use chrono::Utc;
use tokio::time::{sleep_until, Instant};

use super::{SyncHandle, SyncPhase, SyncStatus, Triggers};
use crate::config::MIN_UPDATE_INTERVAL;
use crate::error::{Error, MonitorErrorTrait};
use crate::fetcher::StatusSource;
use crate::message::{CommitOutcome, MessageManager, MessageSink};
use crate::render::StatusRenderer;
use crate::utils::retry::{BackoffPolicy, RetryState};

/// What started a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// Periodic timer
    Tick,
    /// Backoff delay elapsed
    Retry,
    /// Manual refresh request
    Manual,
    /// Requests that arrived during the previous cycle
    FollowUp,
}

/// First instant of the schedule grid strictly after `now`
fn advance(mut next_tick: Instant, interval: Duration, now: Instant) -> Instant {
    while next_tick <= now {
        next_tick += interval;
    }
    next_tick
}

/// Serialized poll loop for the monitored server
///
/// Runs at most one cycle at a time. Each cycle fetches a snapshot, renders
/// it and commits the document through the shared [`MessageManager`].
///
/// # Scheduling
///
/// - The periodic schedule is a fixed grid starting when the loop starts.
/// - Manual refreshes run immediately, even during backoff, without moving
///   the grid.
/// - Anything that arrives while a cycle runs (ticks or refreshes) collapses
///   into exactly one follow-up cycle.
/// - After a failed cycle, periodic ticks are suspended until the backoff
///   delay has elapsed.
pub struct SyncEngine<F, S> {
    source: F,
    manager: Arc<Mutex<MessageManager<S>>>,
    renderer: StatusRenderer,
    interval: Duration,
    backoff: BackoffPolicy,
    retry: RetryState,
    triggers: Arc<Triggers>,
    status: Arc<RwLock<SyncStatus>>,
}

impl<F, S> SyncEngine<F, S>
where
    F: StatusSource,
    S: MessageSink,
{
    pub fn new(
        source: F,
        manager: Arc<Mutex<MessageManager<S>>>,
        renderer: StatusRenderer,
        interval: Duration,
        backoff: BackoffPolicy,
    ) -> Self {
        if interval < MIN_UPDATE_INTERVAL {
            tracing::warn!(
                requested = ?interval,
                floor = ?MIN_UPDATE_INTERVAL,
                "Update interval below floor, raising it"
            );
        }

        Self {
            source,
            manager,
            renderer,
            interval: interval.max(MIN_UPDATE_INTERVAL),
            backoff,
            retry: RetryState::new(),
            triggers: Arc::default(),
            status: Arc::default(),
        }
    }

    /// Handle for requesting refreshes and channel changes
    pub fn handle(&self) -> SyncHandle {
        SyncHandle::new(self.triggers.clone(), self.status.clone())
    }

    /// Shared message manager
    pub fn manager(&self) -> Arc<Mutex<MessageManager<S>>> {
        self.manager.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run until `shutdown` flips or its sender is dropped
    ///
    /// The first cycle runs immediately. A cycle that is in progress when
    /// shutdown is requested runs to completion; callers bound that with a
    /// timeout.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            server = %self.renderer.server_pattern(),
            interval = ?self.interval,
            "Sync engine started"
        );

        let mut next_tick = Instant::now();
        let mut follow_up = false;

        loop {
            if *shutdown.borrow() {
                break;
            }

            let trigger = if follow_up {
                follow_up = false;
                Trigger::FollowUp
            } else {
                let (wake_at, on_wake) = match self.retry.next_attempt_at() {
                    Some(at) => (at, Trigger::Retry),
                    None => (next_tick, Trigger::Tick),
                };

                tokio::select! {
                    biased;
                    _ = shutdown.changed() => break,
                    _ = self.triggers.notified() => {
                        // Wakeups left over from requests a cycle already served
                        if !self.triggers.take_refresh() {
                            continue;
                        }
                        Trigger::Manual
                    }
                    _ = sleep_until(wake_at) => on_wake,
                }
            };

            let now = Instant::now();
            next_tick = advance(next_tick, self.interval, now);
            self.triggers.take_refresh();

            self.run_cycle(trigger).await;

            let now = Instant::now();
            let refresh_requested = self.triggers.take_refresh();
            let tick_elapsed = next_tick <= now;
            next_tick = advance(next_tick, self.interval, now);

            follow_up = refresh_requested || (tick_elapsed && !self.retry.is_backing_off());
            if follow_up {
                tracing::debug!(
                    refresh_requested,
                    tick_elapsed,
                    "Triggers arrived during cycle, running one follow-up"
                );
            }
        }

        self.set_phase(SyncPhase::Stopped).await;
        tracing::info!("Sync engine stopped");
    }

    async fn set_phase(&self, phase: SyncPhase) {
        self.status.write().await.phase = phase;
    }

    async fn run_cycle(&mut self, trigger: Trigger) {
        if let Some(channel) = self.triggers.take_channel() {
            self.manager.lock().await.set_channel(channel);
        }

        tracing::debug!(?trigger, "Starting sync cycle");
        let result = self.sync_once().await;
        let now = Instant::now();

        match result {
            Ok(outcome) => {
                self.retry.record_success();
                log_outcome(outcome);
            }
            Err(e) => {
                let delay = self.retry.record_failure(&self.backoff, now);
                tracing::warn!(
                    error = %e,
                    category = %e.category(),
                    failures = self.retry.failures(),
                    retry_in = ?delay,
                    "Sync cycle failed, keeping last status message"
                );
            }
        }

        let mut status = self.status.write().await;
        status.cycles += 1;
        status.consecutive_failures = self.retry.failures();
        if self.retry.failures() == 0 {
            status.last_success = Some(Utc::now());
        }
        status.phase = if self.retry.is_backing_off() {
            SyncPhase::Backoff
        } else {
            SyncPhase::Idle
        };
    }

    async fn sync_once(&mut self) -> Result<CommitOutcome, Error> {
        self.set_phase(SyncPhase::Fetching).await;
        let snapshot = self.source.fetch(self.renderer.server_pattern()).await?;

        self.set_phase(SyncPhase::Rendering).await;
        let doc = self.renderer.render(&snapshot);

        self.set_phase(SyncPhase::Committing).await;
        let outcome = self.manager.lock().await.commit(&doc).await?;
        Ok(outcome)
    }
}

fn log_outcome(outcome: CommitOutcome) {
    match outcome {
        CommitOutcome::Sent(message) | CommitOutcome::Recreated(message) => {
            tracing::info!(message_id = %message, "Status message posted");
        }
        CommitOutcome::Edited => tracing::debug!("Status message updated"),
        CommitOutcome::Unchanged => tracing::debug!("Status unchanged"),
        CommitOutcome::NoChannel => {
            tracing::debug!("No update channel configured, waiting for setchannel");
        }
        CommitOutcome::ChannelLost(channel) => {
            tracing::warn!(
                channel_id = %channel,
                "Update channel is gone, waiting for setchannel"
            );
        }
    }
}
