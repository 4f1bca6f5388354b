use serde::{Deserialize, Serialize};
use showtape_common::{FormatCode, StreamParams, VideoFormat};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub download: DownloadConfig,

    #[serde(default)]
    pub api: ApiConfig,

    /// Authorization context sent with every stream request.
    #[serde(default)]
    pub stream: StreamParams,

    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DownloadConfig {
    /// Desired track format (1-5).
    #[serde(default = "default_format")]
    pub format: FormatCode,

    /// Desired video format (1-5).
    #[serde(default = "default_video_format")]
    pub video_format: VideoFormat,

    /// Output directory. Created if missing.
    #[serde(default = "default_out_path")]
    pub out_path: PathBuf,

    /// Download the video of releases that have both tracks and a video.
    #[serde(default)]
    pub force_video: bool,

    /// Skip releases that only have a video.
    #[serde(default)]
    pub skip_videos: bool,

    /// Do not embed chapters into videos.
    #[serde(default)]
    pub skip_chapters: bool,
}

fn default_format() -> FormatCode {
    FormatCode::Flac16
}

fn default_video_format() -> VideoFormat {
    VideoFormat::P1080
}

fn default_out_path() -> PathBuf {
    PathBuf::from("showtape downloads")
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            video_format: default_video_format(),
            out_path: default_out_path(),
            force_video: false,
            skip_videos: false,
            skip_chapters: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Base URL of the stream API, with trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent as `Referer` on track downloads.
    #[serde(default = "default_player_url")]
    pub player_url: String,

    /// User agent for metadata and track requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// User agent for the stream-metadata endpoint.
    #[serde(default = "default_stream_user_agent")]
    pub stream_user_agent: String,
}

fn default_base_url() -> String {
    "https://streamapi.nugs.net/".to_string()
}
fn default_player_url() -> String {
    "https://play.nugs.net/".to_string()
}
fn default_user_agent() -> String {
    "NugsNet/3.26.724 (Android; 7.1.2; Asus; ASUS_Z01QD; Scale/2.0; en)".to_string()
}
fn default_stream_user_agent() -> String {
    "nugsnetAndroid".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            player_url: default_player_url(),
            user_agent: default_user_agent(),
            stream_user_agent: default_stream_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}
