//! Gateway event handling

use async_trait::async_trait;
use serenity::all::{Context, CreateMessage, EventHandler, Message, Ready};
use std::sync::Arc;

use super::{commit_error, to_embed};
use crate::commands::{CommandContext, CommandRouter, Invocation};
use crate::message::ChannelId;
use crate::render::RenderableDocument;
use crate::utils::error::CommitError;

/// Platform services for a command received as a Discord message
struct MessageCommand<'a> {
    ctx: &'a Context,
    msg: &'a Message,
}

#[async_trait]
impl<'a> CommandContext for MessageCommand<'a> {
    async fn is_admin(&self) -> bool {
        // Direct messages never carry guild permissions
        if self.msg.guild_id.is_none() {
            return false;
        }

        match self.msg.author_permissions(&self.ctx.cache) {
            Some(permissions) => permissions.administrator(),
            None => {
                tracing::debug!(
                    author = %self.msg.author.id,
                    "Author permissions not cached, treating as non-admin"
                );
                false
            }
        }
    }

    async fn reply(&self, doc: RenderableDocument) -> Result<(), CommitError> {
        self.msg
            .channel_id
            .send_message(self.ctx, CreateMessage::new().embed(to_embed(&doc)))
            .await
            .map_err(commit_error)?;
        Ok(())
    }
}

/// Serenity event handler routing prefix commands
pub struct Handler {
    router: Arc<CommandRouter>,
}

impl Handler {
    pub fn new(router: Arc<CommandRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        tracing::info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            prefix = %self.router.prefix(),
            "Connected to Discord"
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot || !msg.content.starts_with(self.router.prefix()) {
            return;
        }

        let invocation = Invocation::new(ChannelId(msg.channel_id.get()), msg.content.as_str());
        let command = MessageCommand {
            ctx: &ctx,
            msg: &msg,
        };

        if let Some(outcome) = self.router.dispatch(&command, &invocation).await {
            tracing::debug!(?outcome, author = %msg.author.id, "Command handled");
        }
    }
}
