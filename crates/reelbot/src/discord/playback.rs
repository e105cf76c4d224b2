//! Hand-off of resolved stream URLs to whatever owns voice playback.
//!
//! The bot never joins voice itself. `CommandRelay` posts the music bot's play
//! command into the channel; music bots that ignore other bots (Red does by
//! default) will not act on it, so the requester is always told which bot is
//! expected to pick it up and what to run if nothing plays.

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::id::ChannelId;

/// Starts playback of a resolved stream.
#[async_trait]
pub trait Playback: Send + Sync {
    /// Hands `media_url` off and returns the notice shown to the requester.
    async fn play(&self, http: &Http, channel_id: ChannelId, media_url: &str) -> anyhow::Result<String>;
}

/// Posts `<play command> <url>` for an external music bot.
#[derive(Debug, Clone)]
pub struct CommandRelay {
    play_command: String,
    music_bot: Option<u64>,
}

impl CommandRelay {
    pub fn new(play_command: impl Into<String>, music_bot: Option<u64>) -> Self {
        Self {
            play_command: play_command.into(),
            music_bot,
        }
    }

    pub fn command_text(&self, media_url: &str) -> String {
        format!("{} {}", self.play_command, media_url)
    }

    /// Tells the requester who should act on the relayed command.
    pub fn notice(&self, media_url: &str) -> String {
        let target = match self.music_bot {
            Some(id) => format!("<@{}>", id),
            None => "the music bot in this channel".to_string(),
        };
        format!(
            "Sent `{}` for {} to play. If nothing starts, it ignores commands from other bots; run `{}` yourself.",
            self.play_command,
            target,
            self.command_text(media_url)
        )
    }
}

#[async_trait]
impl Playback for CommandRelay {
    async fn play(&self, http: &Http, channel_id: ChannelId, media_url: &str) -> anyhow::Result<String> {
        log::info!("Relaying stream to music bot in channel {}", channel_id);
        channel_id.say(http, self.command_text(media_url)).await?;
        Ok(self.notice(media_url))
    }
}
