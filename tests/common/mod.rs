//! Common test utilities

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use bfbc2_monitor::fetcher::StatusSource;
use bfbc2_monitor::message::{ChannelId, MessageId, MessageSink};
use bfbc2_monitor::models::{ServerRecord, ServerStatusSnapshot};
use bfbc2_monitor::render::RenderableDocument;
use bfbc2_monitor::utils::error::{CommitError, FetchError};

/// Listing entry for the canonical test server
#[allow(dead_code)]
pub fn awesome_listing_entry() -> Value {
    json!({
        "N": "My Awesome BFBC2 Server [24/7]",
        "AP": 3,
        "MP": 32,
        "B-U-level": "levels/mp_001",
        "B-U-gamemode": "CONQUEST",
        "B-U-region": "EU",
        "I": "203.0.113.7",
        "P": 19567,
        "LID": 257,
        "GID": 12345
    })
}

/// Listing entry with a given name
#[allow(dead_code)]
pub fn listing_entry(name: &str, lid: u64, gid: u64) -> Value {
    json!({
        "N": name,
        "AP": 0,
        "MP": 16,
        "B-U-level": "Levels/NAM_MP_005",
        "B-U-gamemode": "RUSH",
        "B-U-region": "NA",
        "I": "198.51.100.4",
        "P": "19567",
        "LID": lid,
        "GID": gid
    })
}

/// Details payload with the given player names
#[allow(dead_code)]
pub fn details_with_players(names: &[&str]) -> Value {
    let players: Vec<Value> = names.iter().map(|name| json!({ "name": name })).collect();
    json!({ "D-Players": players })
}

/// Online snapshot of a server with the given players
#[allow(dead_code)]
pub fn online_snapshot(players: &[&str]) -> ServerStatusSnapshot {
    let record: ServerRecord =
        serde_json::from_value(awesome_listing_entry()).expect("valid listing entry");
    ServerStatusSnapshot::online(
        &record,
        players.iter().map(|p| p.to_string()).collect(),
        chrono::Utc::now(),
    )
}

/// One call observed by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub enum SinkCall {
    Send(ChannelId),
    Edit(ChannelId, MessageId),
    Delete(ChannelId, MessageId),
}

/// Message sink that records calls and can be told to fail edits
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingSink {
    pub calls: Mutex<Vec<SinkCall>>,
    pub documents: Mutex<Vec<RenderableDocument>>,
    edit_failures: Mutex<VecDeque<CommitError>>,
    next_id: AtomicU64,
}

#[allow(dead_code)]
impl RecordingSink {
    /// Make the next edit fail with `err`
    pub fn fail_next_edit(&self, err: CommitError) {
        self.edit_failures.lock().unwrap().push_back(err);
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&SinkCall) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn last_document(&self) -> Option<RenderableDocument> {
        self.documents.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(
        &self,
        channel: ChannelId,
        doc: &RenderableDocument,
    ) -> Result<MessageId, CommitError> {
        self.calls.lock().unwrap().push(SinkCall::Send(channel));
        self.documents.lock().unwrap().push(doc.clone());
        Ok(MessageId(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)))
    }

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        doc: &RenderableDocument,
    ) -> Result<(), CommitError> {
        self.calls.lock().unwrap().push(SinkCall::Edit(channel, message));
        if let Some(err) = self.edit_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.documents.lock().unwrap().push(doc.clone());
        Ok(())
    }

    async fn delete(&self, channel: ChannelId, message: MessageId) -> Result<(), CommitError> {
        self.calls.lock().unwrap().push(SinkCall::Delete(channel, message));
        Ok(())
    }
}

/// Status source that plays back a script, then reports the server offline
#[derive(Default)]
#[allow(dead_code)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<ServerStatusSnapshot, FetchError>>>,
    pub fetches: AtomicU64,
}

#[allow(dead_code)]
impl ScriptedSource {
    pub fn new(script: Vec<Result<ServerStatusSnapshot, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, _pattern: &str) -> Result<ServerStatusSnapshot, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(ServerStatusSnapshot::offline(chrono::Utc::now())))
    }
}
