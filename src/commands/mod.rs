//! Chat command routing
//!
//! Text commands are parsed from message content and dispatched by
//! [`CommandRouter`]. Admin checks and replies go through the
//! [`CommandContext`] seam so routing works without a live connection.
//!
//! Commands that affect the live message only enqueue work on the
//! [`SyncHandle`]; the `server` command does its own ad-hoc fetch and never
//! touches the tracked message.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::fetcher::StatusSource;
use crate::message::ChannelId;
use crate::render::replies;
use crate::render::RenderableDocument;
use crate::sync::SyncHandle;
use crate::utils::error::CommitError;

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Make the invoking channel the update channel (admin)
    SetChannel,
    /// Force an update of the live message (admin)
    Refresh,
    /// One-off status reply
    Server,
    /// Static bot information
    Info,
}

impl Command {
    /// Parse a message, returning `None` for anything that is not a known command
    ///
    /// Command names are case-sensitive and trailing arguments are ignored.
    pub fn parse(content: &str, prefix: &str) -> Option<Self> {
        let rest = content.trim_start().strip_prefix(prefix)?;
        let name = rest.split_whitespace().next()?;
        // "! info" is not a command
        if !rest.starts_with(name) {
            return None;
        }

        match name {
            "setchannel" => Some(Self::SetChannel),
            "refresh" => Some(Self::Refresh),
            "server" => Some(Self::Server),
            "info" => Some(Self::Info),
            _ => None,
        }
    }

    /// Whether the command needs the admin capability
    pub fn requires_admin(&self) -> bool {
        matches!(self, Self::SetChannel | Self::Refresh)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::SetChannel => "setchannel",
            Self::Refresh => "refresh",
            Self::Server => "server",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A received command message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Channel the command was sent in
    pub channel_id: ChannelId,

    /// Raw message content
    pub content: String,
}

impl Invocation {
    pub fn new(channel_id: ChannelId, content: impl Into<String>) -> Self {
        Self {
            channel_id,
            content: content.into(),
        }
    }
}

/// Platform services needed while handling one command
#[async_trait]
pub trait CommandContext: Send + Sync {
    /// Whether the sender holds the admin capability
    async fn is_admin(&self) -> bool;

    /// Reply in the invoking channel
    async fn reply(&self, doc: RenderableDocument) -> Result<(), CommitError>;
}

/// Result of handling a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Update channel changed and a refresh was requested
    ChannelSet(ChannelId),
    /// A refresh was requested
    RefreshRequested,
    /// Status reply sent; `online` tells whether the server was found
    ServerReplied { online: bool },
    /// The listing could not be fetched for the status reply
    ServerUnavailable,
    /// Info reply sent
    InfoReplied,
    /// Admin command from a non-admin; nothing changed
    PermissionDenied(Command),
}

/// Dispatches parsed commands
pub struct CommandRouter {
    prefix: String,
    server_pattern: String,
    interval: Duration,
    sync: SyncHandle,
    source: Arc<dyn StatusSource>,
}

impl CommandRouter {
    pub fn new(
        prefix: impl Into<String>,
        server_pattern: impl Into<String>,
        interval: Duration,
        sync: SyncHandle,
        source: Arc<dyn StatusSource>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            server_pattern: server_pattern.into(),
            interval,
            sync,
            source,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handle one message
    ///
    /// Returns `None` when the message is not a known command. Reply
    /// failures are logged and do not change the outcome.
    pub async fn dispatch<C>(&self, ctx: &C, invocation: &Invocation) -> Option<CommandOutcome>
    where
        C: CommandContext + ?Sized,
    {
        let command = Command::parse(&invocation.content, &self.prefix)?;

        tracing::debug!(
            command = %command,
            channel_id = %invocation.channel_id,
            "Handling command"
        );

        if command.requires_admin() && !ctx.is_admin().await {
            tracing::info!(
                command = %command,
                channel_id = %invocation.channel_id,
                "Admin command rejected"
            );
            self.send(ctx, replies::permission_denied_reply()).await;
            return Some(CommandOutcome::PermissionDenied(command));
        }

        let outcome = match command {
            Command::SetChannel => {
                let channel = invocation.channel_id;
                self.sync.set_channel(channel);
                tracing::info!(channel_id = %channel, "Update channel set");

                let mention = format!("<#{channel}>");
                self.send(
                    ctx,
                    replies::channel_set_reply(&mention, &self.server_pattern, self.interval),
                )
                .await;
                CommandOutcome::ChannelSet(channel)
            }
            Command::Refresh => {
                self.sync.request_refresh();
                self.send(ctx, replies::refresh_reply()).await;
                CommandOutcome::RefreshRequested
            }
            Command::Server => self.server(ctx).await,
            Command::Info => {
                self.send(
                    ctx,
                    replies::info_reply(&self.server_pattern, self.interval, &self.prefix),
                )
                .await;
                CommandOutcome::InfoReplied
            }
        };

        Some(outcome)
    }

    async fn server<C>(&self, ctx: &C) -> CommandOutcome
    where
        C: CommandContext + ?Sized,
    {
        match self.source.fetch(&self.server_pattern).await {
            Ok(snapshot) => {
                let online = snapshot.is_online();
                self.send(ctx, replies::server_reply(&snapshot, &self.server_pattern))
                    .await;
                CommandOutcome::ServerReplied { online }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Status fetch for server command failed");
                self.send(ctx, replies::server_unavailable_reply()).await;
                CommandOutcome::ServerUnavailable
            }
        }
    }

    async fn send<C>(&self, ctx: &C, doc: RenderableDocument)
    where
        C: CommandContext + ?Sized,
    {
        if let Err(e) = ctx.reply(doc).await {
            tracing::warn!(error = %e, "Failed to send command reply");
        }
    }
}
