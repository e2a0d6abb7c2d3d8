//! Property tests for status rendering

mod common;

use proptest::prelude::*;
use std::time::Duration;

use bfbc2_monitor::models::ServerStatusSnapshot;
use bfbc2_monitor::render::status::{FIELD_MAP, FIELD_MODE};
use bfbc2_monitor::render::{split_columns, Accent, StatusRenderer};

fn renderer() -> StatusRenderer {
    StatusRenderer::new("Awesome", Duration::from_secs(120))
}

proptest! {
    /// Left column gets ceil(n/2) names, and concatenating both columns
    /// gives back the original order
    #[test]
    fn split_keeps_order_and_balance(players in prop::collection::vec("[a-zA-Z0-9_]{1,16}", 0..64)) {
        let (left, right) = split_columns(&players);

        prop_assert_eq!(left.len(), players.len().div_ceil(2));
        prop_assert!(left.len() >= right.len());
        prop_assert!(left.len() - right.len() <= 1);

        let joined: Vec<String> = left.iter().chain(right.iter()).cloned().collect();
        prop_assert_eq!(joined, players);
    }

    /// Every player shows up in the rendered document exactly where the
    /// split puts it
    #[test]
    fn active_render_lists_every_player(count in 1usize..40) {
        let names: Vec<String> = (0..count).map(|i| format!("soldier_{i:02}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let doc = renderer().render(&common::online_snapshot(&refs));

        prop_assert_eq!(doc.accent, Accent::Green);
        let text = doc.text();
        for name in &names {
            prop_assert!(text.contains(name.as_str()));
        }
        let (_, right) = split_columns(&names);
        let columns = doc.fields.iter().filter(|f| f.name.is_empty()).count();
        prop_assert_eq!(columns, if right.is_empty() { 1 } else { 2 });
    }
}

/// Offline documents never carry map, mode or player content
#[test]
fn offline_render_has_no_server_details() {
    let doc = renderer().render(&ServerStatusSnapshot::offline(chrono::Utc::now()));

    assert_eq!(doc.accent, Accent::Red);
    assert!(doc.find_field(FIELD_MAP).is_none());
    assert!(doc.find_field(FIELD_MODE).is_none());
    assert!(!doc.text().contains("Online Players"));
    assert!(doc.description.unwrap().contains("Awesome"));
}

/// An empty server still shows its map and mode
#[test]
fn empty_render_shows_map_and_mode() {
    let doc = renderer().render(&common::online_snapshot(&[]));

    assert_eq!(doc.accent, Accent::Yellow);
    assert_eq!(doc.find_field(FIELD_MAP).unwrap().value, "Panama Canal");
    assert_eq!(doc.find_field(FIELD_MODE).unwrap().value, "Conquest");
    assert!(doc.text().contains("0/32"));
}
