//! Discord transport: gateway client, prefix commands and reply plumbing.

pub mod commands;
pub mod handler;
pub mod playback;
pub mod reply;

use anyhow::{bail, Context as _};
use handler::Handler;
use playback::CommandRelay;
use reelcore::config;
use reelcore::conversion::ConversionClient;
use reelcore::download::{ytdlp_version, YtDlpFetcher};
use reelcore::storage::{create_pool, SqliteSettings};
use reelcore::{Reuploader, StreamableClient};
use serenity::http::Http;
use serenity::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Connects to the gateway and runs until Ctrl+C.
pub async fn run_bot() -> anyhow::Result<()> {
    let token = config::DISCORD_TOKEN.clone();
    if token.is_empty() {
        bail!("DISCORD_TOKEN is not set");
    }

    let pool = create_pool(&config::DATABASE_PATH).context("failed to open settings database")?;
    let settings = Arc::new(SqliteSettings::new(pool));

    match ytdlp_version(&config::YTDL_BIN).await {
        Ok(version) => log::info!("Using yt-dlp {}", version),
        Err(e) => log::warn!("yt-dlp is not usable ({}); TikTok downloads will fail", e),
    }

    let shutdown = CancellationToken::new();
    let reuploader = Reuploader::new(
        Arc::new(YtDlpFetcher::from_config()),
        StreamableClient::from_config()?,
        settings.clone(),
        config::SOURCE_DOMAIN.as_str(),
    )
    .with_shutdown(shutdown.clone());

    let owners = resolve_owners(&token).await;
    log::info!("{} owner(s) may set Streamable credentials", owners.len());

    let handler = Handler {
        prefix: config::COMMAND_PREFIX.clone(),
        owners,
        reuploader: Arc::new(reuploader),
        settings,
        conversion: ConversionClient::from_config()?,
        playback: Arc::new(CommandRelay::new(config::PLAY_COMMAND.as_str(), *config::MUSIC_BOT_ID)),
    };

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
        | GatewayIntents::GUILD_VOICE_STATES;

    let mut client = Client::builder(&token, intents)
        .event_handler(handler)
        .await
        .context("failed to create Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Shutting down");
        shutdown.cancel();
        shard_manager.shutdown_all().await;
    });

    log::info!("Starting Discord client");
    client.start().await.context("Discord client stopped with an error")?;
    Ok(())
}

/// Configured `OWNER_IDS` plus the application owner reported by Discord.
async fn resolve_owners(token: &str) -> HashSet<u64> {
    let mut owners: HashSet<u64> = config::owner::OWNER_IDS.iter().copied().collect();
    match Http::new(token).get_current_application_info().await {
        Ok(info) => {
            if let Some(owner) = info.owner {
                owners.insert(owner.id.get());
            }
        }
        Err(e) => log::warn!("Could not fetch application info: {}", e),
    }
    owners
}
