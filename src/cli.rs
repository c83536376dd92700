use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidquery")]
#[command(about = "Ask questions about YouTube videos through a VidQuery backend")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Base URL of the VidQuery backend
    #[arg(long, global = true, env = "VIDQUERY_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Read settings from this JSON file instead of the per-user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ask a single question about a video
    Ask {
        /// YouTube video URL or video ID
        video: String,

        /// Your question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Show the video ID and embed address for a URL or ID
    Resolve {
        /// YouTube video URL or video ID
        input: String,

        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Open the interactive chat (default)
    Chat {
        /// Pre-fill the video field
        #[arg(short, long)]
        video: Option<String>,
    },
}
