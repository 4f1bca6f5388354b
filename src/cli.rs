use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "showtape")]
#[command(author, version, about = "Concert audio and video downloader")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download releases, videos and livestreams
    Get {
        /// Release/video URLs, container ids, or .txt files listing them
        #[arg(required = true)]
        urls: Vec<String>,

        /// Track format: 1 = ALAC, 2 = FLAC, 3 = MQA, 4 = 360 / best available, 5 = AAC
        #[arg(short = 'f', long, value_parser = clap::value_parser!(u8).range(1..=5))]
        format: Option<u8>,

        /// Video format: 1 = 480p, 2 = 720p, 3 = 1080p, 4 = 1440p, 5 = 4K / best available
        #[arg(short = 'F', long, value_parser = clap::value_parser!(u8).range(1..=5))]
        video_format: Option<u8>,

        /// Output directory, created if missing
        #[arg(short, long)]
        out_path: Option<PathBuf>,

        /// Download the video of releases that also have tracks
        #[arg(long)]
        force_video: bool,

        /// Skip video-only releases
        #[arg(long)]
        skip_videos: bool,

        /// Don't embed chapters into videos
        #[arg(long)]
        skip_chapters: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
