use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "reelbot")]
#[command(author, version, about = "Discord bot that re-uploads TikTok links and resolves YouTube audio", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the Discord bot (default)
    Run,

    /// Download a video with yt-dlp and print where it was saved
    Fetch {
        /// Video URL
        url: String,
    },

    /// Resolve a direct audio stream URL through the conversion API
    Convert {
        /// YouTube URL
        url: String,
    },

    /// Download, upload to Streamable and wait for processing using the stored credentials
    Reupload {
        /// Video URL
        url: String,
    },

    /// Print the installed yt-dlp version
    CheckYtdlp,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
