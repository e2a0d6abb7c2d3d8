//! Whole-listing statistics

use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;

use crate::catalog;
use crate::models::ServerRecord;

/// Summary of the entire upstream listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListingStats {
    pub total_servers: usize,
    pub active_servers: usize,
    pub total_players: u64,
    pub total_capacity: u64,
    /// Game mode label and server count, most common first
    pub game_modes: Vec<(String, usize)>,
    /// Region name and server count, most common first
    pub regions: Vec<(String, usize)>,
    /// Most populated servers as (name, occupancy)
    pub top_servers: Vec<(String, String)>,
}

impl ListingStats {
    /// Compute statistics from a listing, keeping the `top` busiest servers
    pub fn from_servers(servers: &[ServerRecord], top: usize) -> Self {
        let game_modes = count_by(servers, |s| {
            catalog::game_mode_name(s.game_mode.as_deref().unwrap_or("Unknown"))
        });
        let regions = count_by(servers, |s| {
            catalog::region_name(s.region.as_deref().unwrap_or("Unknown"))
        });

        let mut by_population: Vec<&ServerRecord> = servers.iter().collect();
        by_population.sort_by(|a, b| b.active_players.cmp(&a.active_players));
        let top_servers = by_population
            .into_iter()
            .take(top)
            .map(|s| {
                (
                    s.name.clone(),
                    format!("{}/{}", s.active_players, s.max_players),
                )
            })
            .collect();

        Self {
            total_servers: servers.len(),
            active_servers: servers.iter().filter(|s| s.active_players > 0).count(),
            total_players: servers.iter().map(|s| u64::from(s.active_players)).sum(),
            total_capacity: servers.iter().map(|s| u64::from(s.max_players)).sum(),
            game_modes,
            regions,
            top_servers,
        }
    }

    /// Share of total capacity in use, in percent
    pub fn capacity_percentage(&self) -> f64 {
        if self.total_capacity == 0 {
            0.0
        } else {
            self.total_players as f64 / self.total_capacity as f64 * 100.0
        }
    }

    /// Format as display string
    pub fn display(&self) -> String {
        let mut output = String::from("BFBC2 Server Statistics\n");
        let _ = writeln!(output, "{:-<40}", "");
        let _ = writeln!(output, "Total Servers: {}", self.total_servers);
        let _ = writeln!(output, "Active Servers: {}", self.active_servers);
        let _ = writeln!(
            output,
            "Players: {}/{} ({:.1}% capacity)",
            self.total_players,
            self.total_capacity,
            self.capacity_percentage()
        );

        output.push_str("\nGame Modes:\n");
        for (mode, count) in &self.game_modes {
            let _ = writeln!(output, "  {mode:<20} {count:>3}");
        }

        output.push_str("\nRegions:\n");
        for (region, count) in &self.regions {
            let _ = writeln!(output, "  {region:<20} {count:>3}");
        }

        if !self.top_servers.is_empty() {
            output.push_str("\nMost Populated:\n");
            for (i, (name, occupancy)) in self.top_servers.iter().enumerate() {
                let _ = writeln!(output, "  {}. {name} - {occupancy}", i + 1);
            }
        }

        output
    }
}

fn count_by<F>(servers: &[ServerRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&ServerRecord) -> String,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for server in servers {
        *counts.entry(key(server)).or_default() += 1;
    }

    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}
