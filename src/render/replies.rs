//! One-off command replies
//!
//! These documents are sent once in response to a command and are never
//! tracked or edited afterwards.

use std::time::Duration;

use super::status::split_columns;
use super::{Accent, RenderableDocument};
use crate::models::ServerStatusSnapshot;
use crate::utils::{format_interval, truncate_text};

const MAX_COLUMN_CHARS: usize = 1024;

fn column_text(players: &[String]) -> String {
    let text = players
        .iter()
        .map(|player| format!("• {player}"))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_text(&text, MAX_COLUMN_CHARS)
}

/// Reply to the `server` command
pub fn server_reply(snapshot: &ServerStatusSnapshot, server_pattern: &str) -> RenderableDocument {
    if !snapshot.is_online() {
        return RenderableDocument::new("❌ Server Not Found", Accent::Red)
            .description(format!("Could not find server: **{server_pattern}**"));
    }

    let accent = if snapshot.players().is_empty() {
        Accent::Yellow
    } else {
        Accent::Green
    };

    let mut doc = RenderableDocument::new(snapshot.server_name(), accent)
        .description(format!(
            "**{}** - {}",
            snapshot.map_display_name(),
            snapshot.game_mode()
        ))
        .field("👥 Players", snapshot.occupancy(), true)
        .field("🌍 Region", snapshot.region(), true)
        .timestamp(snapshot.observed_at());

    let (left, right) = split_columns(snapshot.players());
    if !left.is_empty() {
        doc = doc.field("🎯 Online Players (Part 1)", column_text(left), true);
    }
    if !right.is_empty() {
        doc = doc.field("🎯 Online Players (Part 2)", column_text(right), true);
    }
    doc
}

/// Reply to the `server` command when the listing could not be fetched
pub fn server_unavailable_reply() -> RenderableDocument {
    RenderableDocument::new("⚠️ Server List Unavailable", Accent::Red)
        .description("The server list could not be reached right now. Please try again shortly.")
}

/// Reply to the `info` command
pub fn info_reply(server_pattern: &str, interval: Duration, prefix: &str) -> RenderableDocument {
    RenderableDocument::new("🎮 BFBC2 Server Monitor Bot", Accent::Blurple)
        .description("I monitor BFBC2 server status and player activity!")
        .field(
            "📊 Features",
            "• Real-time server status monitoring\n\
             • Player count and list tracking\n\
             • Map and game mode information\n\
             • Configurable update interval",
            false,
        )
        .field(
            "⚙️ Commands",
            format!(
                "• `{prefix}setchannel` - Set update channel (Admin only)\n\
                 • `{prefix}info` - Show this information\n\
                 • `{prefix}server` - Get current server status\n\
                 • `{prefix}refresh` - Force refresh server data (Admin only)"
            ),
            false,
        )
        .field("🎯 Monitored Server", format!("**{server_pattern}**"), false)
        .field(
            "⏱️ Update Interval",
            format!("Every {}", format_interval(interval)),
            false,
        )
}

/// Confirmation for the `setchannel` command
pub fn channel_set_reply(
    channel_mention: &str,
    server_pattern: &str,
    interval: Duration,
) -> RenderableDocument {
    RenderableDocument::new("✅ Channel Set", Accent::Green)
        .description(format!(
            "This channel ({channel_mention}) will now receive BFBC2 server updates!"
        ))
        .field("🎮 Monitoring Server", format!("**{server_pattern}**"), false)
        .field(
            "⏱️ Update Interval",
            format!("Every {}", format_interval(interval)),
            false,
        )
}

/// Acknowledgement for the `refresh` command
pub fn refresh_reply() -> RenderableDocument {
    RenderableDocument::new("🔄 Refresh Triggered", Accent::Green)
        .description("The server status message is being refreshed now!")
}

/// Notice for admin commands invoked without the admin capability
pub fn permission_denied_reply() -> RenderableDocument {
    RenderableDocument::new("❌ Permission Denied", Accent::Red)
        .description("You don't have permission to use this command!")
}
