//! Live status rendering

use std::time::Duration;

use super::{Accent, RenderableDocument};
use crate::models::ServerStatusSnapshot;
use crate::utils::{format_interval, truncate_text};

/// Title shared by every live status document
pub const STATUS_TITLE: &str = "🎮 BFBC2 Server Status";

/// Platforms cap field values; keep a column inside that limit
const MAX_COLUMN_CHARS: usize = 1024;

pub const FIELD_MAP: &str = "🗺️ Map";
pub const FIELD_MODE: &str = "🎯 Game Mode";
pub const FIELD_STATUS: &str = "📊 Status";

/// Split players into two columns
///
/// The left column gets `ceil(n/2)` names and the right column the rest.
/// Order is preserved within each column.
pub fn split_columns(players: &[String]) -> (&[String], &[String]) {
    players.split_at(players.len().div_ceil(2))
}

fn column_text(players: &[String]) -> String {
    let text = players
        .iter()
        .map(|player| format!("•  {player}"))
        .collect::<Vec<_>>()
        .join("\n");
    truncate_text(&text, MAX_COLUMN_CHARS)
}

/// Renders snapshots into the live status document
#[derive(Debug, Clone)]
pub struct StatusRenderer {
    /// Configured match pattern, shown when the server cannot be found
    server_pattern: String,
    interval: Duration,
}

impl StatusRenderer {
    pub fn new(server_pattern: impl Into<String>, interval: Duration) -> Self {
        Self {
            server_pattern: server_pattern.into(),
            interval,
        }
    }

    pub fn server_pattern(&self) -> &str {
        &self.server_pattern
    }

    fn footer_text(&self) -> String {
        format!(
            "Updates every {} • BFBC2 Server Monitor",
            format_interval(self.interval)
        )
    }

    /// Render a snapshot
    pub fn render(&self, snapshot: &ServerStatusSnapshot) -> RenderableDocument {
        let doc = if !snapshot.is_online() {
            self.render_offline()
        } else if snapshot.players().is_empty() {
            self.render_empty(snapshot)
        } else {
            self.render_active(snapshot)
        };

        doc.footer(self.footer_text())
            .timestamp(snapshot.observed_at())
    }

    fn render_offline(&self) -> RenderableDocument {
        RenderableDocument::new(STATUS_TITLE, Accent::Red)
            .description(format!("Could not find server: **{}**", self.server_pattern))
            .field(FIELD_STATUS, "🔴 Offline/Not Found", true)
    }

    fn render_empty(&self, snapshot: &ServerStatusSnapshot) -> RenderableDocument {
        RenderableDocument::new(STATUS_TITLE, Accent::Yellow)
            .description(format!("**{}**", snapshot.server_name()))
            .field(FIELD_MAP, snapshot.map_display_name(), true)
            .field(FIELD_MODE, snapshot.game_mode(), true)
            .field(FIELD_STATUS, "🟡 Empty", true)
            .field(
                format!("👥 Online Players: {}", snapshot.occupancy()),
                "",
                false,
            )
    }

    fn render_active(&self, snapshot: &ServerStatusSnapshot) -> RenderableDocument {
        let (left, right) = split_columns(snapshot.players());

        let mut doc = RenderableDocument::new(STATUS_TITLE, Accent::Green)
            .description(format!("**{}**", snapshot.server_name()))
            .field(FIELD_MAP, snapshot.map_display_name(), true)
            .field(FIELD_MODE, snapshot.game_mode(), true)
            .field(FIELD_STATUS, "🟢 Active", true)
            .field(
                format!("👥 Online Players: {}", snapshot.occupancy()),
                "",
                false,
            )
            .field("", column_text(left), true);

        if !right.is_empty() {
            doc = doc.field("", column_text(right), true);
        }
        doc
    }
}
