//! Discord adapter
//!
//! Implements the platform seams ([`MessageSink`], [`CommandContext`]) on top
//! of serenity and converts [`RenderableDocument`]s into embeds.
//!
//! [`CommandContext`]: crate::commands::CommandContext

mod handler;

pub use handler::Handler;

use async_trait::async_trait;
use serenity::all::{
    ChannelId as DiscordChannelId, CreateEmbed, CreateEmbedFooter, CreateMessage, EditMessage,
    GatewayIntents, Http, MessageId as DiscordMessageId,
};
use std::sync::Arc;

use crate::message::{ChannelId, MessageId, MessageSink};
use crate::render::RenderableDocument;
use crate::utils::error::CommitError;

/// Embeds reject empty names and values
const BLANK: &str = "\u{200b}";

/// Gateway intents the bot needs for prefix commands
pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

fn or_blank(text: &str) -> &str {
    if text.is_empty() {
        BLANK
    } else {
        text
    }
}

/// Convert a document into an embed
pub fn to_embed(doc: &RenderableDocument) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title(doc.title.as_str())
        .colour(doc.accent.rgb());

    if let Some(description) = &doc.description {
        embed = embed.description(description.as_str());
    }

    embed = embed.fields(
        doc.fields
            .iter()
            .map(|f| (or_blank(&f.name), or_blank(&f.value), f.inline)),
    );

    if let Some(footer) = &doc.footer {
        embed = embed.footer(CreateEmbedFooter::new(footer.as_str()));
    }

    if let Some(timestamp) = doc.timestamp {
        embed = embed.timestamp(timestamp);
    }

    embed
}

/// Map a serenity error onto the commit taxonomy
///
/// A 404 means the message or channel is gone; everything else is treated
/// as a platform outage.
pub fn commit_error(err: serenity::Error) -> CommitError {
    if let serenity::Error::Http(http_err) = &err {
        if http_err.status_code().map(|status| status.as_u16()) == Some(404) {
            return CommitError::NotFound;
        }
    }
    CommitError::unavailable(err.to_string())
}

/// [`MessageSink`] over the Discord REST API
#[derive(Clone)]
pub struct DiscordSink {
    http: Arc<Http>,
}

impl DiscordSink {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MessageSink for DiscordSink {
    async fn send(
        &self,
        channel: ChannelId,
        doc: &RenderableDocument,
    ) -> Result<MessageId, CommitError> {
        let message = DiscordChannelId::new(channel.0)
            .send_message(&*self.http, CreateMessage::new().embed(to_embed(doc)))
            .await
            .map_err(commit_error)?;
        Ok(MessageId(message.id.get()))
    }

    async fn edit(
        &self,
        channel: ChannelId,
        message: MessageId,
        doc: &RenderableDocument,
    ) -> Result<(), CommitError> {
        DiscordChannelId::new(channel.0)
            .edit_message(
                &*self.http,
                DiscordMessageId::new(message.0),
                EditMessage::new().embed(to_embed(doc)),
            )
            .await
            .map_err(commit_error)?;
        Ok(())
    }

    async fn delete(&self, channel: ChannelId, message: MessageId) -> Result<(), CommitError> {
        DiscordChannelId::new(channel.0)
            .delete_message(&*self.http, DiscordMessageId::new(message.0))
            .await
            .map_err(commit_error)
    }
}
