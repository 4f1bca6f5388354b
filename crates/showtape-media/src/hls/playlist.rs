//! Master and media playlist parsing.

use crate::{Error, Result};
use m3u8_rs::{KeyMethod, MasterPlaylist, MediaPlaylist as RawMediaPlaylist};

use super::Variant;

/// Encryption key tag attached to a media playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentKey {
    /// `METHOD` attribute as written, e.g. `AES-128`.
    pub method: String,
    /// `URI` attribute, relative or absolute.
    pub uri: String,
    /// `IV` attribute including its `0x` prefix, if the tag carried one.
    pub iv: Option<String>,
}

/// The parts of a media playlist the downloader uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaPlaylist {
    /// Segment URIs in playlist order.
    pub segments: Vec<String>,
    /// First key tag that names a key URI.
    pub key: Option<SegmentKey>,
}

fn method_tag(method: &KeyMethod) -> String {
    match method {
        KeyMethod::None => "NONE".to_string(),
        KeyMethod::AES128 => "AES-128".to_string(),
        KeyMethod::SampleAES => "SAMPLE-AES".to_string(),
        KeyMethod::Other(other) => other.clone(),
    }
}

/// Parse a multivariant playlist into its non-I-frame variants, in playlist order.
pub fn parse_master(text: &str) -> Result<Vec<Variant>> {
    let playlist: MasterPlaylist = m3u8_rs::parse_master_playlist_res(text.as_bytes())
        .map_err(|e| Error::parse(format!("invalid master playlist: {e:?}")))?;

    let variants = playlist
        .variants
        .into_iter()
        .filter(|v| !v.is_i_frame)
        .map(|v| Variant {
            bandwidth: v.bandwidth,
            resolution: v
                .resolution
                .map(|r| format!("{}x{}", r.width, r.height))
                .unwrap_or_default(),
            frame_rate: v.frame_rate.unwrap_or_default(),
            uri: v.uri,
        })
        .collect();

    Ok(variants)
}

/// Parse a media playlist.
///
/// Segment listing stops at the first entry without a URI. Some upstream
/// manifests end in such a placeholder; it is not an error.
pub fn parse_media(text: &str) -> Result<MediaPlaylist> {
    let playlist: RawMediaPlaylist = m3u8_rs::parse_media_playlist_res(text.as_bytes())
        .map_err(|e| Error::parse(format!("invalid media playlist: {e:?}")))?;

    let mut segments = Vec::with_capacity(playlist.segments.len());
    let mut key = None;

    for segment in playlist.segments {
        if key.is_none() {
            if let Some(tag) = &segment.key {
                if let Some(uri) = &tag.uri {
                    key = Some(SegmentKey {
                        method: method_tag(&tag.method),
                        uri: uri.clone(),
                        iv: tag.iv.clone(),
                    });
                }
            }
        }

        if segment.uri.trim().is_empty() {
            tracing::debug!("Media playlist ends early after {} segments", segments.len());
            break;
        }
        segments.push(segment.uri);
    }

    Ok(MediaPlaylist { segments, key })
}
