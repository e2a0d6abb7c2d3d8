//! Static translation tables for BFBC2 codes
//!
//! The upstream listing reports raw level, game mode and region codes. These
//! tables turn them into display names. Unknown codes are shown as-is.

/// Level code to map name
const MAP_NAMES: &[(&str, &str)] = &[
    // Base game
    ("Levels/MP_001", "Panama Canal"),
    ("Levels/MP_002", "Valparaiso"),
    ("Levels/MP_003", "Laguna Alta"),
    ("Levels/MP_004", "Isla Inocentes"),
    ("Levels/MP_005", "Atacama Desert"),
    ("Levels/MP_006", "Arica Harbor"),
    ("Levels/MP_007", "White Pass"),
    ("Levels/MP_008", "Nelson Bay"),
    ("Levels/MP_009", "Laguna Presa"),
    ("Levels/MP_012", "Port Valdez"),
    ("Levels/BC1_Oasis", "Oasis"),
    ("Levels/BC1_Harvest_Day", "Harvest Day"),
    ("Levels/MP_SP_002", "Cold War"),
    ("Levels/MP_SP_005", "Heavy Metal"),
    // Vietnam
    ("Levels/NAM_MP_002", "Vantage Point"),
    ("Levels/NAM_MP_003", "Hill 137"),
    ("Levels/NAM_MP_005", "Cao Son Temple"),
    ("Levels/NAM_MP_006", "Phu Bai Valley"),
    ("Levels/NAM_MP_007", "Operation Hastings"),
];

const GAME_MODES: &[(&str, &str)] = &[
    ("CONQUEST", "Conquest"),
    ("RUSH", "Rush"),
    ("SQDM", "Squad Deathmatch"),
    ("SQRUSH", "Squad Rush"),
];

const REGIONS: &[(&str, &str)] = &[
    ("EU", "Europe"),
    ("NA", "North America"),
    ("SA", "South America"),
    ("AS", "Asia"),
    ("OC", "Oceania"),
    ("AF", "Africa"),
];

fn lookup<'a>(table: &[(&str, &'a str)], code: &str) -> Option<&'a str> {
    table
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|(_, name)| *name)
}

/// Resolve a level code such as `Levels/NAM_MP_005`
pub fn map_name(code: &str) -> String {
    lookup(MAP_NAMES, code).unwrap_or(code).to_string()
}

/// Resolve a game mode code such as `RUSH`
pub fn game_mode_name(code: &str) -> String {
    lookup(GAME_MODES, code).unwrap_or(code).to_string()
}

/// Resolve a region code such as `EU`
pub fn region_name(code: &str) -> String {
    lookup(REGIONS, code).unwrap_or(code).to_string()
}
