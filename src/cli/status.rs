use anyhow::{Context, Result};

use bfbc2_monitor::config::UpstreamConfig;
use bfbc2_monitor::fetcher::{ListingStats, RomeClient, ServerListApi, StatusFetcher, StatusSource};
use bfbc2_monitor::models::ServerStatusSnapshot;

fn client(upstream: &UpstreamConfig) -> Result<RomeClient> {
    RomeClient::with_config(
        &upstream.api_url,
        upstream.request_timeout(),
        upstream.requests_per_second,
    )
    .context("Failed to create upstream client")
}

/// Fetch the monitored server once and print it
pub async fn status(upstream: UpstreamConfig, pattern: String, json: bool) -> Result<()> {
    let fetcher = StatusFetcher::new(client(&upstream)?);
    let snapshot = fetcher
        .fetch(&pattern)
        .await
        .with_context(|| format!("Failed to fetch server list from {}", upstream.api_url))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_snapshot(&snapshot, &pattern);
    }
    Ok(())
}

fn print_snapshot(snapshot: &ServerStatusSnapshot, pattern: &str) {
    if !snapshot.is_online() {
        println!("Server not found: {pattern}");
        return;
    }

    println!("{}", snapshot.server_name());
    println!("{:-<40}", "");
    println!("  Map:      {}", snapshot.map_display_name());
    println!("  Mode:     {}", snapshot.game_mode());
    println!("  Region:   {}", snapshot.region());
    println!("  Address:  {}", snapshot.address());
    println!("  Players:  {}", snapshot.occupancy());

    for player in snapshot.players() {
        println!("    - {player}");
    }
}

/// Print statistics for the whole listing
pub async fn overview(upstream: UpstreamConfig, top: usize, json: bool) -> Result<()> {
    let servers = client(&upstream)?
        .list_servers()
        .await
        .with_context(|| format!("Failed to fetch server list from {}", upstream.api_url))?;

    let stats = ListingStats::from_servers(&servers, top);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print!("{}", stats.display());
    }
    Ok(())
}
