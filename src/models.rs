// Core data structures for the status monitor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::catalog;

/// One observation of the monitored server
///
/// A snapshot is either online with every field populated, or offline with
/// everything except `observed_at` left at its default. The constructors are
/// the only way to build one, so a partially populated snapshot cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatusSnapshot {
    server_name: String,
    map_id: String,
    map_display_name: String,
    game_mode: String,
    region: String,
    address: String,
    players: Vec<String>,
    max_players: u32,
    observed_at: DateTime<Utc>,
    online: bool,
}

impl ServerStatusSnapshot {
    /// Build an online snapshot from a listing record and its player names
    ///
    /// Player order is kept exactly as the upstream reported it.
    pub fn online(record: &ServerRecord, players: Vec<String>, observed_at: DateTime<Utc>) -> Self {
        let map_id = record.level.clone().unwrap_or_else(|| "Unknown".to_string());
        let mode_code = record.game_mode.as_deref().unwrap_or("Unknown");
        let region_code = record.region.as_deref().unwrap_or("Unknown");

        Self {
            server_name: record.name.clone(),
            map_display_name: catalog::map_name(&map_id),
            map_id,
            game_mode: catalog::game_mode_name(mode_code),
            region: catalog::region_name(region_code),
            address: record.address(),
            players,
            max_players: record.max_players,
            observed_at,
            online: true,
        }
    }

    /// Build a snapshot for a server that was not found in the listing
    pub fn offline(observed_at: DateTime<Utc>) -> Self {
        Self {
            server_name: String::new(),
            map_id: String::new(),
            map_display_name: String::new(),
            game_mode: String::new(),
            region: String::new(),
            address: String::new(),
            players: Vec::new(),
            max_players: 0,
            observed_at,
            online: false,
        }
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Resolved server name as listed upstream
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Raw level code
    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    pub fn map_display_name(&self) -> &str {
        &self.map_display_name
    }

    pub fn game_mode(&self) -> &str {
        &self.game_mode
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// `ip:port` of the game server
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Player names in upstream order, duplicates included
    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn max_players(&self) -> u32 {
        self.max_players
    }

    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }

    /// Occupancy string such as `12/32`
    pub fn occupancy(&self) -> String {
        format!("{}/{}", self.players.len(), self.max_players)
    }
}

/// Summary record from the upstream server listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerRecord {
    #[serde(rename = "N", default)]
    pub name: String,

    #[serde(rename = "AP", default, deserialize_with = "lenient_u32")]
    pub active_players: u32,

    #[serde(rename = "MP", default, deserialize_with = "lenient_u32")]
    pub max_players: u32,

    #[serde(rename = "B-U-level", default)]
    pub level: Option<String>,

    #[serde(rename = "B-U-gamemode", default)]
    pub game_mode: Option<String>,

    #[serde(rename = "B-U-region", default)]
    pub region: Option<String>,

    #[serde(rename = "I", default)]
    pub ip: Option<String>,

    #[serde(rename = "P", default)]
    pub port: Option<Scalar>,

    /// Lobby id, needed for the details endpoint
    #[serde(rename = "LID", default)]
    pub lid: Option<Scalar>,

    /// Game id, needed for the details endpoint
    #[serde(rename = "GID", default)]
    pub gid: Option<Scalar>,
}

impl ServerRecord {
    /// Case-insensitive substring match against the listed name
    pub fn matches(&self, pattern: &str) -> bool {
        self.name.to_lowercase().contains(&pattern.to_lowercase())
    }

    pub fn address(&self) -> String {
        let ip = self.ip.as_deref().unwrap_or("Unknown");
        match &self.port {
            Some(port) => format!("{ip}:{port}"),
            None => format!("{ip}:Unknown"),
        }
    }

    /// Path segment `{LID}/{GID}` of the details endpoint
    pub fn details_path(&self) -> Option<String> {
        match (&self.lid, &self.gid) {
            (Some(lid), Some(gid)) => Some(format!("{lid}/{gid}")),
            _ => None,
        }
    }
}

/// Detailed record of one server, including the player list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerDetails {
    #[serde(rename = "D-Players", default, deserialize_with = "null_as_empty")]
    pub players: Vec<PlayerRecord>,
}

impl ServerDetails {
    /// Player names in upstream order
    pub fn player_names(&self) -> Vec<String> {
        self.players
            .iter()
            .map(|p| p.name.clone().unwrap_or_else(|| "Unknown".to_string()))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub name: Option<String>,
}

/// A field the upstream reports either as a number or as a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(u64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Scalar>::deserialize(deserializer)?;
    Ok(match value {
        Some(Scalar::Number(n)) => u32::try_from(n).unwrap_or(u32::MAX),
        Some(Scalar::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
