//! Prefix command parsing.
//!
//! Commands are plain text (`!yt <url>`); everything else is left to the re-upload workflow.

/// A recognized bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// `set_streamable_credentials <email> <password>` (owner only)
    SetCredentials { email: String, password: String },
    /// `toggle_video_uploader` (guild administrators only)
    ToggleUploader,
    /// `yt <url>`
    Yt { url: String },
    /// Known command with wrong arguments; carries the usage line
    Usage(&'static str),
}

const SET_CREDENTIALS_USAGE: &str = "Usage: set_streamable_credentials <email> <password>";
const YT_USAGE: &str = "Usage: yt <youtube url>";

/// Parses `content` as a command for `prefix`. Returns `None` for ordinary messages.
pub fn parse_command(prefix: &str, content: &str) -> Option<BotCommand> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let mut parts = rest.split_whitespace();
    let name = parts.next()?.to_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match name.as_str() {
        "set_streamable_credentials" => match args.as_slice() {
            [email, password] => BotCommand::SetCredentials {
                email: (*email).to_string(),
                password: (*password).to_string(),
            },
            _ => BotCommand::Usage(SET_CREDENTIALS_USAGE),
        },
        "toggle_video_uploader" => BotCommand::ToggleUploader,
        "yt" => match args.as_slice() {
            [url] => BotCommand::Yt {
                url: url.trim_start_matches('<').trim_end_matches('>').to_string(),
            },
            _ => BotCommand::Usage(YT_USAGE),
        },
        _ => return None,
    };
    Some(command)
}
