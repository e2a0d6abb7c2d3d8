use anyhow::{Context, Result};
use serenity::all::{Client, Http};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

use bfbc2_monitor::commands::CommandRouter;
use bfbc2_monitor::config::Config;
use bfbc2_monitor::discord::{self, DiscordSink, Handler};
use bfbc2_monitor::fetcher::{RomeClient, StatusFetcher, StatusSource};
use bfbc2_monitor::message::{ChannelId, MessageManager};
use bfbc2_monitor::render::StatusRenderer;
use bfbc2_monitor::shutdown::{wait_for_signal, ShutdownCoordinator};
use bfbc2_monitor::sync::SyncEngine;

/// Run the bot until a shutdown signal arrives or the gateway stops
pub async fn run(config: Config) -> Result<()> {
    let client = RomeClient::with_config(
        &config.upstream.api_url,
        config.request_timeout(),
        config.upstream.requests_per_second,
    )
    .context("Failed to create upstream client")?;
    let source: Arc<dyn StatusSource> = Arc::new(StatusFetcher::new(client));

    let http = Arc::new(Http::new(&config.discord.token));
    let channel = config.discord.update_channel_id.map(ChannelId);
    let manager = Arc::new(Mutex::new(MessageManager::new(DiscordSink::new(http), channel)));

    let interval = config.update_interval();
    let renderer = StatusRenderer::new(&config.monitor.server_name, interval);
    let engine = SyncEngine::new(
        source.clone(),
        manager.clone(),
        renderer,
        interval,
        config.backoff.clone(),
    );

    let router = Arc::new(CommandRouter::new(
        &config.discord.command_prefix,
        &config.monitor.server_name,
        interval,
        engine.handle(),
        source,
    ));

    match channel {
        Some(channel) => tracing::info!(channel_id = %channel, "Using configured update channel"),
        None => tracing::warn!(
            "No update channel configured, use {}setchannel in the target channel",
            config.discord.command_prefix
        ),
    }

    let mut client = Client::builder(&config.discord.token, discord::intents())
        .event_handler(Handler::new(router))
        .await
        .context("Failed to create Discord client")?;
    let shard_manager = client.shard_manager.clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let engine_task = tokio::spawn(engine.run(shutdown_rx));
    let mut gateway = tokio::spawn(async move { client.start().await });

    tracing::info!(
        server = %config.monitor.server_name,
        interval = ?interval,
        "BFBC2 server monitor running"
    );

    let gateway_result = tokio::select! {
        _ = wait_for_signal() => None,
        result = &mut gateway => Some(result),
    };

    if gateway_result.is_none() {
        shard_manager.shutdown_all().await;
    }

    if let Err(e) = ShutdownCoordinator::new(shutdown_tx, engine_task, manager)
        .shutdown()
        .await
    {
        tracing::warn!(error = %e, "Could not remove the status message");
    }

    match gateway_result {
        None => {
            let _ = gateway.await;
            tracing::info!("Shutdown complete");
            Ok(())
        }
        Some(Ok(Ok(()))) => {
            tracing::info!("Discord client stopped");
            Ok(())
        }
        Some(Ok(Err(e))) => Err(e).context("Discord client failed"),
        Some(Err(e)) => Err(e).context("Discord client task panicked"),
    }
}
