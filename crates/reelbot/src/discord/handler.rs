use super::commands::{parse_command, BotCommand};
use super::playback::Playback;
use super::reply::MessageReply;
use reelcore::conversion::ConversionClient;
use reelcore::storage::SettingsStore;
use reelcore::workflow::{IncomingMessage, JobState, Reuploader};
use secrecy::SecretString;
use serenity::async_trait;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

pub struct Handler {
    pub prefix: String,
    pub owners: HashSet<u64>,
    pub reuploader: Arc<Reuploader>,
    pub settings: Arc<dyn SettingsStore>,
    pub conversion: ConversionClient,
    pub playback: Arc<dyn Playback>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!(
            "Connected as {} in {} guild(s), watching for {} links",
            ready.user.name,
            ready.guilds.len(),
            self.reuploader.source_domain()
        );
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match parse_command(&self.prefix, &msg.content) {
            Some(command) => self.run_command(&ctx, &msg, command).await,
            None => self.reupload_links(&ctx, &msg).await,
        }
    }
}

impl Handler {
    async fn reupload_links(&self, ctx: &Context, msg: &Message) {
        let incoming = IncomingMessage {
            guild_id: msg.guild_id.map(|id| id.get()),
            author_is_bot: msg.author.bot,
            content: msg.content.clone(),
        };
        let sink = MessageReply::new(ctx.http.clone(), msg);

        let outcomes = self.reuploader.handle_message(&incoming, &sink).await;
        let failed = outcomes.iter().filter(|o| o.state == JobState::Failed).count();
        if !outcomes.is_empty() {
            log::info!(
                "Message {}: {} link(s) processed, {} failed",
                msg.id,
                outcomes.len(),
                failed
            );
        }
    }

    async fn run_command(&self, ctx: &Context, msg: &Message, command: BotCommand) {
        match command {
            BotCommand::SetCredentials { email, password } => self.set_credentials(ctx, msg, email, password).await,
            BotCommand::ToggleUploader => self.toggle_uploader(ctx, msg).await,
            BotCommand::Yt { url } => self.play_youtube(ctx, msg, &url).await,
            BotCommand::Usage(usage) => say(ctx, msg, usage).await,
        }
    }

    async fn set_credentials(&self, ctx: &Context, msg: &Message, email: String, password: String) {
        if !self.owners.contains(&msg.author.id.get()) {
            log::warn!("User {} tried to set Streamable credentials", msg.author.id);
            say(ctx, msg, "Only the bot owner can set Streamable credentials.").await;
            return;
        }

        // The password is in the message body; remove it before anything else.
        if let Err(e) = msg.delete(&ctx.http).await {
            log::warn!("Failed to delete credentials message {}: {}", msg.id, e);
        }

        let password = SecretString::from(password);
        match self.settings.set_hosting_credentials(&email, &password).await {
            Ok(()) => {
                log::info!("Streamable credentials updated for {}", email);
                say(ctx, msg, "Streamable credentials set successfully.").await;
            }
            Err(e) => {
                log::error!("Failed to store Streamable credentials: {}", e);
                say(ctx, msg, "Failed to store Streamable credentials.").await;
            }
        }
    }

    async fn toggle_uploader(&self, ctx: &Context, msg: &Message) {
        let Some(guild_id) = msg.guild_id else {
            say(ctx, msg, "This command only works in a server.").await;
            return;
        };

        let is_admin = msg
            .author_permissions(&ctx.cache)
            .map(|perms| perms.administrator())
            .unwrap_or(false);
        if !is_admin {
            say(ctx, msg, "You need the Administrator permission to do that.").await;
            return;
        }

        match self.settings.toggle_uploader(guild_id.get()).await {
            Ok(enabled) => {
                let state = if enabled { "enabled" } else { "disabled" };
                log::info!("Video uploader {} in guild {}", state, guild_id);
                say(ctx, msg, &format!("Video uploader {}.", state)).await;
            }
            Err(e) => {
                log::error!("Failed to toggle uploader in guild {}: {}", guild_id, e);
                say(ctx, msg, "Failed to update the uploader setting.").await;
            }
        }
    }

    async fn play_youtube(&self, ctx: &Context, msg: &Message, url: &str) {
        if !author_in_voice(ctx, msg) {
            say(ctx, msg, "You are not connected to a voice channel.").await;
            return;
        }

        match self.conversion.request_conversion(url).await {
            Ok(media_url) => match self.playback.play(&ctx.http, msg.channel_id, &media_url).await {
                Ok(notice) => say(ctx, msg, &notice).await,
                Err(e) => {
                    log::error!("Failed to hand stream to playback: {}", e);
                    say(ctx, msg, "Could not hand the stream to the music bot.").await;
                }
            },
            Err(e) => {
                log::error!("Conversion failed for {}: {:?}", url, e);
                say(ctx, msg, &format!("An error occurred while trying to retrieve the audio: {}", e)).await;
            }
        }
    }
}

/// Checked against the gateway cache; the guild ref must not live across an await.
fn author_in_voice(ctx: &Context, msg: &Message) -> bool {
    let Some(guild_id) = msg.guild_id else {
        return false;
    };
    ctx.cache
        .guild(guild_id)
        .and_then(|guild| guild.voice_states.get(&msg.author.id).and_then(|state| state.channel_id))
        .is_some()
}

async fn say(ctx: &Context, msg: &Message, text: &str) {
    if let Err(e) = msg.channel_id.say(&ctx.http, text).await {
        log::warn!("Failed to send message to channel {}: {}", msg.channel_id, e);
    }
}
