//! Graceful shutdown
//!
//! Order matters: the engine is told to stop first so no new cycle starts,
//! the cycle in flight gets a bounded grace period, and only then is the
//! live message deleted, exactly once.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::message::{MessageManager, MessageSink};
use crate::utils::error::CommitError;

/// Grace period for a cycle that is running when shutdown starts
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Stops the sync engine and removes the live message
pub struct ShutdownCoordinator<S> {
    shutdown: watch::Sender<bool>,
    engine: JoinHandle<()>,
    manager: Arc<Mutex<MessageManager<S>>>,
    grace: Duration,
}

impl<S: MessageSink> ShutdownCoordinator<S> {
    pub fn new(
        shutdown: watch::Sender<bool>,
        engine: JoinHandle<()>,
        manager: Arc<Mutex<MessageManager<S>>>,
    ) -> Self {
        Self {
            shutdown,
            engine,
            manager,
            grace: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Override the grace period
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Run the shutdown sequence
    ///
    /// Consumes the coordinator, so the live message is cleared at most once.
    pub async fn shutdown(self) -> Result<(), CommitError> {
        tracing::info!("Shutting down sync engine");
        let _ = self.shutdown.send(true);

        let mut engine = self.engine;
        match tokio::time::timeout(self.grace, &mut engine).await {
            Ok(Ok(())) => tracing::debug!("Sync engine finished"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Sync engine task failed"),
            Err(_) => {
                tracing::warn!(
                    grace = ?self.grace,
                    "Sync cycle still running after grace period, abandoning it"
                );
                engine.abort();
                // Wait for the task to drop so it releases the manager
                let _ = engine.await;
            }
        }

        let result = self.manager.lock().await.clear().await;
        match &result {
            Ok(()) => tracing::info!("Live message cleaned up"),
            Err(e) => tracing::warn!(error = %e, "Live message cleanup failed"),
        }
        result
    }
}

/// Wait for Ctrl+C or, on unix, SIGTERM
pub async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to wait for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{ChannelId, MessageId};
    use crate::render::{Accent, RenderableDocument};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct DeleteCounter {
        deletes: AtomicUsize,
    }

    #[async_trait]
    impl MessageSink for DeleteCounter {
        async fn send(
            &self,
            _channel: ChannelId,
            _doc: &RenderableDocument,
        ) -> Result<MessageId, CommitError> {
            Ok(MessageId(1))
        }

        async fn edit(
            &self,
            _channel: ChannelId,
            _message: MessageId,
            _doc: &RenderableDocument,
        ) -> Result<(), CommitError> {
            Ok(())
        }

        async fn delete(&self, _channel: ChannelId, _message: MessageId) -> Result<(), CommitError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    async fn manager_with_message(
        sink: Arc<DeleteCounter>,
    ) -> Arc<Mutex<MessageManager<Arc<DeleteCounter>>>> {
        let mut manager = MessageManager::new(sink, Some(ChannelId(1)));
        manager
            .commit(&RenderableDocument::new("Status", Accent::Green))
            .await
            .unwrap();
        Arc::new(Mutex::new(manager))
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_engine_then_clears() {
        let sink = Arc::new(DeleteCounter::default());
        let manager = manager_with_message(sink.clone()).await;
        let (tx, mut rx) = watch::channel(false);
        let engine = tokio::spawn(async move {
            let _ = rx.changed().await;
        });

        ShutdownCoordinator::new(tx, engine, manager.clone())
            .shutdown()
            .await
            .unwrap();

        assert_eq!(sink.deletes.load(Ordering::SeqCst), 1);
        assert!(manager.lock().await.handle().message_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stuck_cycle_is_abandoned() {
        let sink = Arc::new(DeleteCounter::default());
        let manager = manager_with_message(sink.clone()).await;
        let (tx, _rx) = watch::channel(false);

        // Holds the manager the way a stuck commit would
        let held = manager.clone();
        let engine = tokio::spawn(async move {
            let _guard = held.lock().await;
            std::future::pending::<()>().await;
        });
        tokio::task::yield_now().await;

        ShutdownCoordinator::new(tx, engine, manager)
            .with_grace_period(Duration::from_secs(1))
            .shutdown()
            .await
            .unwrap();

        assert_eq!(sink.deletes.load(Ordering::SeqCst), 1);
    }
}
