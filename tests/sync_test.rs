//! End-to-end tests for the sync engine, message manager and command router
//!
//! Time is paused so periodic cycles run instantly and deterministically.

mod common;

use async_trait::async_trait;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{watch, Mutex};

use bfbc2_monitor::commands::{CommandContext, CommandOutcome, CommandRouter, Invocation};
use bfbc2_monitor::fetcher::StatusSource;
use bfbc2_monitor::message::{ChannelId, MessageId, MessageManager};
use bfbc2_monitor::models::ServerStatusSnapshot;
use bfbc2_monitor::render::{status::FIELD_STATUS, RenderableDocument, StatusRenderer};
use bfbc2_monitor::shutdown::ShutdownCoordinator;
use bfbc2_monitor::sync::{SyncEngine, SyncPhase};
use bfbc2_monitor::utils::error::{CommitError, FetchError};
use bfbc2_monitor::utils::retry::BackoffPolicy;

use common::{online_snapshot, RecordingSink, ScriptedSource, SinkCall};

const INTERVAL: Duration = Duration::from_secs(10);
const CHANNEL: ChannelId = ChannelId(42);

type Manager = Arc<Mutex<MessageManager<Arc<RecordingSink>>>>;

fn setup(
    script: Vec<Result<ServerStatusSnapshot, FetchError>>,
    channel: Option<ChannelId>,
) -> (
    SyncEngine<Arc<ScriptedSource>, Arc<RecordingSink>>,
    Arc<ScriptedSource>,
    Arc<RecordingSink>,
    Manager,
) {
    let source = Arc::new(ScriptedSource::new(script));
    let sink = Arc::new(RecordingSink::default());
    let manager = Arc::new(Mutex::new(MessageManager::new(sink.clone(), channel)));
    let engine = SyncEngine::new(
        source.clone(),
        manager.clone(),
        StatusRenderer::new("Awesome", INTERVAL),
        INTERVAL,
        BackoffPolicy::with_delays(10, 60),
    );
    (engine, source, sink, manager)
}

fn offline() -> Result<ServerStatusSnapshot, FetchError> {
    Ok(ServerStatusSnapshot::offline(chrono::Utc::now()))
}

fn status_value(doc: &RenderableDocument) -> String {
    doc.find_field(FIELD_STATUS)
        .map(|field| field.value.clone())
        .unwrap_or_default()
}

struct ChatContext {
    admin: bool,
    replies: StdMutex<Vec<RenderableDocument>>,
}

impl ChatContext {
    fn new(admin: bool) -> Self {
        Self {
            admin,
            replies: StdMutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl CommandContext for ChatContext {
    async fn is_admin(&self) -> bool {
        self.admin
    }

    async fn reply(&self, doc: RenderableDocument) -> Result<(), CommitError> {
        self.replies.lock().unwrap().push(doc);
        Ok(())
    }
}

/// Test that going offline edits the existing message instead of deleting it
#[tokio::test(start_paused = true)]
async fn test_offline_edits_message_in_place() {
    let (engine, _source, sink, manager) =
        setup(vec![Ok(online_snapshot(&["Alpha", "Bravo"])), offline()], Some(CHANNEL));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));

    tokio::time::sleep(Duration::from_secs(15)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(
        sink.calls(),
        vec![SinkCall::Send(CHANNEL), SinkCall::Edit(CHANNEL, MessageId(1000))]
    );
    let last = sink.last_document().unwrap();
    assert!(status_value(&last).contains("Offline"));
    assert_eq!(manager.lock().await.handle().message_id, Some(MessageId(1000)));
}

/// Test that an unchanged status is not re-sent on later cycles
#[tokio::test(start_paused = true)]
async fn test_unchanged_status_is_suppressed() {
    let (engine, source, sink, _manager) = setup(vec![], Some(CHANNEL));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));

    tokio::time::sleep(Duration::from_secs(35)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(source.fetch_count(), 4);
    assert_eq!(sink.calls(), vec![SinkCall::Send(CHANNEL)]);
}

/// Test that a message deleted by a user is recreated on the next cycle
#[tokio::test(start_paused = true)]
async fn test_deleted_message_is_recreated() {
    let (engine, _source, sink, manager) = setup(
        vec![
            Ok(online_snapshot(&["Alpha"])),
            Ok(online_snapshot(&["Alpha", "Bravo"])),
        ],
        Some(CHANNEL),
    );
    sink.fail_next_edit(CommitError::NotFound);

    let handle = engine.handle();
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));

    tokio::time::sleep(Duration::from_secs(15)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Send(CHANNEL),
            SinkCall::Edit(CHANNEL, MessageId(1000)),
            SinkCall::Send(CHANNEL),
        ]
    );
    assert_eq!(manager.lock().await.handle().message_id, Some(MessageId(1001)));

    let status = handle.status().await;
    assert_eq!(status.consecutive_failures, 0);
    assert_eq!(status.phase, SyncPhase::Stopped);
}

/// Test that a failed fetch leaves the last status message untouched
#[tokio::test(start_paused = true)]
async fn test_fetch_failure_keeps_last_message() {
    let (engine, _source, sink, _manager) = setup(
        vec![
            Ok(online_snapshot(&["Alpha"])),
            Err(FetchError::transient("upstream down")),
        ],
        Some(CHANNEL),
    );
    let handle = engine.handle();
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));

    tokio::time::sleep(Duration::from_secs(15)).await;
    let status = handle.status().await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(status.consecutive_failures, 1);
    assert_eq!(status.phase, SyncPhase::Backoff);
    assert_eq!(sink.calls(), vec![SinkCall::Send(CHANNEL)]);
    assert!(status_value(&sink.last_document().unwrap()).contains("Active"));
}

/// Test that a non-admin cannot move the live message
#[tokio::test(start_paused = true)]
async fn test_setchannel_requires_admin() {
    let (engine, source, sink, manager) = setup(vec![], Some(CHANNEL));
    let handle = engine.handle();
    let router = CommandRouter::new(
        "!",
        "Awesome",
        INTERVAL,
        handle.clone(),
        source.clone() as Arc<dyn StatusSource>,
    );
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let ctx = ChatContext::new(false);
    let outcome = router
        .dispatch(&ctx, &Invocation::new(ChannelId(7), "!setchannel"))
        .await;

    assert!(matches!(outcome, Some(CommandOutcome::PermissionDenied(_))));
    assert_eq!(ctx.replies.lock().unwrap().len(), 1);
    assert_eq!(handle.channel_pending(), None);
    assert!(!handle.refresh_pending());

    tokio::time::sleep(Duration::from_secs(1)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(manager.lock().await.channel(), Some(CHANNEL));
    assert_eq!(sink.calls(), vec![SinkCall::Send(CHANNEL)]);
}

/// Test that an admin setchannel moves the live message on the next cycle
#[tokio::test(start_paused = true)]
async fn test_setchannel_moves_live_message() {
    let (engine, source, sink, manager) = setup(vec![], None);
    let router = CommandRouter::new(
        "!",
        "Awesome",
        INTERVAL,
        engine.handle(),
        source.clone() as Arc<dyn StatusSource>,
    );
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(sink.calls().is_empty());

    let ctx = ChatContext::new(true);
    let outcome = router
        .dispatch(&ctx, &Invocation::new(ChannelId(7), "!setchannel"))
        .await;
    assert_eq!(outcome, Some(CommandOutcome::ChannelSet(ChannelId(7))));

    tokio::time::sleep(Duration::from_secs(1)).await;
    tx.send(true).unwrap();
    task.await.unwrap();

    assert_eq!(manager.lock().await.channel(), Some(ChannelId(7)));
    assert_eq!(sink.calls(), vec![SinkCall::Send(ChannelId(7))]);
    assert_eq!(source.fetch_count(), 2);
}

/// Test that shutdown removes the live message exactly once
#[tokio::test(start_paused = true)]
async fn test_shutdown_clears_message_once() {
    let (engine, _source, sink, manager) =
        setup(vec![Ok(online_snapshot(&["Alpha"]))], Some(CHANNEL));
    let (tx, rx) = watch::channel(false);
    let task = tokio::spawn(engine.run(rx));
    tokio::time::sleep(Duration::from_secs(1)).await;

    ShutdownCoordinator::new(tx, task, manager.clone())
        .shutdown()
        .await
        .unwrap();

    // A second clear finds nothing to delete
    manager.lock().await.clear().await.unwrap();

    assert_eq!(
        sink.count(|call| matches!(call, SinkCall::Delete(..))),
        1
    );
    assert_eq!(
        sink.calls().last(),
        Some(&SinkCall::Delete(CHANNEL, MessageId(1000)))
    );
    assert_eq!(manager.lock().await.handle().message_id, None);
}
