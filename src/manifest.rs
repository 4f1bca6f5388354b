//! Fetch side of manifest interpretation.
//!
//! Parsing and selection live in `showtape_media`; this module only fetches
//! playlists and resolves the URIs inside them. Nothing is cached.

use crate::http;
use reqwest::Client;
use showtape_common::{EncodingCandidate, Result, VideoFormat};
use showtape_media::{
    extract_bitrate, order_variants, parse_master, parse_media, select_variant, ManifestBase,
    MediaPlaylist, VariantChoice,
};

/// A video variant together with the URL of its media playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct ChosenVariant {
    pub choice: VariantChoice,
    pub playlist_url: String,
}

/// A media playlist with every URI resolved to a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlaylist {
    pub segment_urls: Vec<String>,
    pub key_url: Option<String>,
    pub key_method: Option<String>,
    pub key_iv: Option<String>,
}

impl ResolvedPlaylist {
    /// Whether the first two entries are the same file.
    pub fn is_single_asset(&self) -> bool {
        match self.segment_urls.as_slice() {
            [] | [_] => true,
            [first, second, ..] => first == second,
        }
    }
}

fn resolve_uri(base: &ManifestBase, uri: &str) -> String {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        uri.to_string()
    } else {
        base.resolve(uri)
    }
}

pub struct ManifestInterpreter {
    client: Client,
}

impl ManifestInterpreter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = http::send(self.client.get(url)).await?;
        http::text(response).await
    }

    /// Fetch a master playlist and pick the video variant for `desired`.
    pub async fn choose_variant(&self, url: &str, desired: VideoFormat) -> Result<ChosenVariant> {
        let base = ManifestBase::parse(url)?;
        let variants = parse_master(&self.fetch_text(url).await?)?;
        let choice = select_variant(variants, desired)?;

        if choice.fell_back {
            tracing::warn!("Unavailable in your chosen format, using {}", choice.label);
        }

        Ok(ChosenVariant {
            playlist_url: resolve_uri(&base, &choice.variant.uri),
            choice,
        })
    }

    /// Fetch and parse a media playlist without resolving its URIs.
    pub async fn media_playlist(&self, url: &str) -> Result<MediaPlaylist> {
        parse_media(&self.fetch_text(url).await?)
    }

    /// Fetch a media playlist and resolve its segment and key URIs.
    pub async fn resolved_playlist(&self, url: &str) -> Result<ResolvedPlaylist> {
        let base = ManifestBase::parse(url)?;
        let playlist = self.media_playlist(url).await?;

        let segment_urls = playlist
            .segments
            .iter()
            .map(|uri| resolve_uri(&base, uri))
            .collect();
        let (key_url, key_method, key_iv) = match playlist.key {
            Some(key) => (Some(resolve_uri(&base, &key.uri)), Some(key.method), key.iv),
            None => (None, None, None),
        };

        Ok(ResolvedPlaylist {
            segment_urls,
            key_url,
            key_method,
            key_iv,
        })
    }

    /// Segment URLs of a media playlist, in order.
    pub async fn list_segments(&self, url: &str) -> Result<Vec<String>> {
        Ok(self.resolved_playlist(url).await?.segment_urls)
    }

    /// Point an adaptive audio candidate at its top-bandwidth variant.
    pub async fn resolve_adaptive_audio(
        &self,
        candidate: &EncodingCandidate,
    ) -> Result<EncodingCandidate> {
        let base = ManifestBase::parse(candidate.url())?;
        let variants = order_variants(parse_master(&self.fetch_text(candidate.url()).await?)?);
        let top = variants
            .first()
            .ok_or(showtape_common::Error::NoVariantAvailable)?;

        let bitrate = extract_bitrate(&top.uri)?;
        Ok(candidate.with_variant(format!("{bitrate} Kbps AAC"), base.resolve(&top.uri)))
    }
}
