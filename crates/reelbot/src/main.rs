mod cli;
mod discord;

use anyhow::Context as _;
use async_trait::async_trait;
use cli::{Cli, Commands};
use reelcore::config;
use reelcore::conversion::ConversionClient;
use reelcore::core::init_logger;
use reelcore::download::{ytdlp_version, MediaFetcher, YtDlpFetcher};
use reelcore::storage::{create_pool, SqliteSettings};
use reelcore::workflow::{JobState, ReplySink, Reuploader};
use reelcore::{AppResult, SourceLink, StreamableClient};
use std::sync::Arc;
use url::Url;

/// Prints workflow replies to stdout for the one-shot CLI commands.
struct ConsoleReply;

#[async_trait]
impl ReplySink for ConsoleReply {
    async fn reply(&self, text: &str) -> AppResult<()> {
        println!("{}", text);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_logger(&config::LOG_FILE_PATH)?;

    let cli = Cli::parse_args();
    match cli.command {
        None | Some(Commands::Run) => discord::run_bot().await,
        Some(Commands::Fetch { url }) => {
            let url = Url::parse(&url).context("invalid URL")?;
            let media = YtDlpFetcher::from_config().fetch(&url).await?;
            let size = media.size_bytes();
            let path = media.keep();
            println!("{} ({} bytes)", path.display(), size);
            Ok(())
        }
        Some(Commands::Convert { url }) => {
            let media_url = ConversionClient::from_config()?.request_conversion(&url).await?;
            println!("{}", media_url);
            Ok(())
        }
        Some(Commands::Reupload { url }) => reupload_once(&url).await,
        Some(Commands::CheckYtdlp) => {
            let version = ytdlp_version(&config::YTDL_BIN).await?;
            println!("yt-dlp {}", version);
            Ok(())
        }
    }
}

async fn reupload_once(url: &str) -> anyhow::Result<()> {
    let url = Url::parse(url).context("invalid URL")?;
    let source_host = url.host_str().unwrap_or_default().to_string();
    let link = SourceLink { url, source_host };

    let pool = create_pool(&config::DATABASE_PATH)?;
    let reuploader = Reuploader::new(
        Arc::new(YtDlpFetcher::from_config()),
        StreamableClient::from_config()?,
        Arc::new(SqliteSettings::new(pool)),
        config::SOURCE_DOMAIN.as_str(),
    );

    let outcome = reuploader.run_link(&link, &ConsoleReply).await;
    if outcome.state == JobState::Failed {
        anyhow::bail!("re-upload of {} failed", outcome.url);
    }
    Ok(())
}
