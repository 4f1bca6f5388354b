use serde::Deserialize;
use showtape_av::ChapterMark;
use showtape_common::paths::release_name;

/// Product format marking an on-demand video.
pub const VIDEO_ON_DEMAND: &str = "VIDEO ON DEMAND";
/// Product format marking a livestream video.
pub const LIVE_HD_VIDEO: &str = "LIVE HD VIDEO";

/// Stream-metadata response. Only the link is used.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamMeta {
    #[serde(default)]
    pub stream_link: Option<String>,
}

/// `catalog.container` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct ContainerEnvelope {
    #[serde(rename = "Response")]
    pub response: Option<Release>,
}

/// A release container: an album, a show, or a video.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    #[serde(default)]
    pub artist_name: String,

    #[serde(default)]
    pub container_info: String,

    #[serde(rename = "containerID", default)]
    pub container_id: u64,

    #[serde(default)]
    pub tracks: Option<Vec<Track>>,

    #[serde(default)]
    pub products: Option<Vec<Product>>,

    #[serde(default)]
    pub product_format_list: Option<Vec<Product>>,

    #[serde(default)]
    pub video_chapters: Option<Vec<VideoChapter>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(rename = "trackID")]
    pub track_id: u64,

    #[serde(default)]
    pub song_title: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default)]
    pub format_str: String,

    #[serde(rename = "skuID", default)]
    pub sku_id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoChapter {
    #[serde(rename = "chapterSeconds")]
    pub chapter_seconds: f64,

    #[serde(rename = "chaptername", default)]
    pub chapter_name: String,
}

fn first_sku<'a>(products: impl IntoIterator<Item = &'a Product>, formats: &[&str]) -> Option<u64> {
    products
        .into_iter()
        .find(|p| formats.contains(&p.format_str.as_str()) && p.sku_id != 0)
        .map(|p| p.sku_id)
}

impl Release {
    pub fn tracks(&self) -> &[Track] {
        self.tracks.as_deref().unwrap_or_default()
    }

    /// `<artist> - <container info>`.
    pub fn display_name(&self) -> String {
        release_name(&self.artist_name, &self.container_info)
    }

    /// Sku of the on-demand video, if the release has one.
    pub fn video_sku(&self) -> Option<u64> {
        first_sku(
            self.products.iter().flatten(),
            &[VIDEO_ON_DEMAND, LIVE_HD_VIDEO],
        )
    }

    /// Sku of the livestream video, if the release has one.
    pub fn livestream_sku(&self) -> Option<u64> {
        first_sku(self.product_format_list.iter().flatten(), &[LIVE_HD_VIDEO])
    }

    /// Chapter marks, or `None` when the release has none.
    pub fn chapter_marks(&self) -> Option<Vec<ChapterMark>> {
        let chapters = self.video_chapters.as_deref()?;
        if chapters.is_empty() {
            return None;
        }
        Some(
            chapters
                .iter()
                .map(|c| ChapterMark::new(c.chapter_seconds, c.chapter_name.clone()))
                .collect(),
        )
    }
}
