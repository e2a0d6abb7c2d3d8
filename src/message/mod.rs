//! Live status message lifecycle
//!
//! [`MessageManager`] owns the single live message: it sends it once, edits
//! it in place afterwards, and deletes it on shutdown. The chat platform is
//! reached only through the [`MessageSink`] trait so the lifecycle can be
//! exercised without a live connection.
//!
//! # Handle invalidation
//!
//! When the platform reports the tracked message as missing, the handle is
//! dropped and a fresh message is sent in the same commit. When the channel
//! itself is missing, the channel is forgotten as well and nothing is posted
//! until a new channel is configured.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::render::RenderableDocument;
use crate::utils::error::CommitError;

/// Chat channel identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Chat message identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Message primitives offered by the chat platform
#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Post a new message and return its identifier
    async fn send(
        &self,
        channel: ChannelId,
        doc: &RenderableDocument,
    ) -> Result<MessageId, CommitError>;

    /// Replace the content of an existing message
    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        doc: &RenderableDocument,
    ) -> Result<(), CommitError>;

    /// Remove a message
    async fn delete(&self, channel: ChannelId, message: MessageId) -> Result<(), CommitError>;
}

#[async_trait]
impl<T: MessageSink + ?Sized> MessageSink for Arc<T> {
    async fn send(
        &self,
        channel: ChannelId,
        doc: &RenderableDocument,
    ) -> Result<MessageId, CommitError> {
        (**self).send(channel, doc).await
    }

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        doc: &RenderableDocument,
    ) -> Result<(), CommitError> {
        (**self).edit(channel, message, doc).await
    }

    async fn delete(&self, channel: ChannelId, message: MessageId) -> Result<(), CommitError> {
        (**self).delete(channel, message).await
    }
}

/// State of the live message
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LiveMessageHandle {
    /// Target channel, unset until configured
    pub channel_id: Option<ChannelId>,

    /// Live message, unset until the first successful send
    pub message_id: Option<MessageId>,

    /// Last document actually committed, used for diff suppression
    pub last_rendered: Option<RenderableDocument>,
}

impl LiveMessageHandle {
    fn forget_message(&mut self) {
        self.message_id = None;
        self.last_rendered = None;
    }
}

/// What a commit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new live message was posted
    Sent(MessageId),
    /// The live message was edited in place
    Edited,
    /// The tracked message was gone and a replacement was posted
    ///
    /// The replacement goes out within the same commit, not on the next one.
    Recreated(MessageId),
    /// Content matched the last commit, nothing was sent
    Unchanged,
    /// No channel configured yet
    NoChannel,
    /// The configured channel no longer exists and was forgotten
    ChannelLost(ChannelId),
}

/// Owner of the live message
pub struct MessageManager<S> {
    sink: S,
    handle: LiveMessageHandle,
}

impl<S: MessageSink> MessageManager<S> {
    pub fn new(sink: S, channel: Option<ChannelId>) -> Self {
        Self {
            sink,
            handle: LiveMessageHandle {
                channel_id: channel,
                ..Default::default()
            },
        }
    }

    pub fn handle(&self) -> &LiveMessageHandle {
        &self.handle
    }

    pub fn channel(&self) -> Option<ChannelId> {
        self.handle.channel_id
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Point the live message at a channel
    ///
    /// Switching to a different channel forgets the old message without
    /// touching it; messages are never moved between channels. Selecting the
    /// current channel again keeps the tracked message so the channel never
    /// holds two live messages. Returns the previous channel.
    pub fn set_channel(&mut self, channel: ChannelId) -> Option<ChannelId> {
        let previous = self.handle.channel_id;
        if previous == Some(channel) {
            tracing::debug!(channel_id = %channel, "Channel unchanged, keeping live message");
            return previous;
        }

        tracing::info!(
            channel_id = %channel,
            previous = ?previous.map(|c| c.0),
            "Live message channel changed"
        );
        self.handle.channel_id = Some(channel);
        self.handle.forget_message();
        previous
    }

    /// Commit a document to the live message
    ///
    /// Sends on first use, edits in place afterwards and skips the platform
    /// entirely when the content matches the last commit.
    pub async fn commit(&mut self, doc: &RenderableDocument) -> Result<CommitOutcome, CommitError> {
        let Some(channel) = self.handle.channel_id else {
            tracing::debug!("No channel configured, skipping commit");
            return Ok(CommitOutcome::NoChannel);
        };

        let Some(message) = self.handle.message_id else {
            return self.send_new(channel, doc, false).await;
        };

        if self
            .handle
            .last_rendered
            .as_ref()
            .is_some_and(|last| last.same_content(doc))
        {
            tracing::trace!(message_id = %message, "Content unchanged, skipping edit");
            return Ok(CommitOutcome::Unchanged);
        }

        match self.sink.edit(channel, message, doc).await {
            Ok(()) => {
                self.handle.last_rendered = Some(doc.clone());
                tracing::debug!(channel_id = %channel, message_id = %message, "Live message updated");
                Ok(CommitOutcome::Edited)
            }
            Err(CommitError::NotFound) => {
                tracing::warn!(
                    channel_id = %channel,
                    message_id = %message,
                    "Live message was deleted, sending a new one"
                );
                self.handle.forget_message();
                self.send_new(channel, doc, true).await
            }
            Err(e) => Err(e),
        }
    }

    async fn send_new(
        &mut self,
        channel: ChannelId,
        doc: &RenderableDocument,
        replacing: bool,
    ) -> Result<CommitOutcome, CommitError> {
        match self.sink.send(channel, doc).await {
            Ok(message) => {
                self.handle.message_id = Some(message);
                self.handle.last_rendered = Some(doc.clone());
                tracing::info!(channel_id = %channel, message_id = %message, "Sent new live message");
                if replacing {
                    Ok(CommitOutcome::Recreated(message))
                } else {
                    Ok(CommitOutcome::Sent(message))
                }
            }
            Err(CommitError::NotFound) => {
                tracing::warn!(channel_id = %channel, "Channel no longer exists, forgetting it");
                self.handle = LiveMessageHandle::default();
                Ok(CommitOutcome::ChannelLost(channel))
            }
            Err(e) => Err(e),
        }
    }

    /// Delete the live message and reset the handle
    ///
    /// Idempotent: with nothing tracked this is a no-op. A message that is
    /// already gone counts as deleted.
    pub async fn clear(&mut self) -> Result<(), CommitError> {
        let handle = std::mem::take(&mut self.handle);

        let (Some(channel), Some(message)) = (handle.channel_id, handle.message_id) else {
            return Ok(());
        };

        match self.sink.delete(channel, message).await {
            Ok(()) => {
                tracing::info!(channel_id = %channel, message_id = %message, "Live message deleted");
                Ok(())
            }
            Err(CommitError::NotFound) => {
                tracing::info!(message_id = %message, "Live message was already deleted");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(message_id = %message, error = %e, "Could not delete live message");
                Err(e)
            }
        }
    }
}
