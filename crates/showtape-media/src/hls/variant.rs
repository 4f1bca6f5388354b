//! Variant ordering and selection.

use crate::{Error, Result};
use regex::Regex;
use showtape_common::VideoFormat;
use std::cmp::Reverse;
use std::sync::OnceLock;

/// Next height to try when no variant matches the current one.
pub const RESOLUTION_FALLBACK: &[(u32, u32)] = &[(1440, 1080), (1080, 720), (720, 480)];

/// One entry of a master playlist.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub bandwidth: u64,
    /// `RESOLUTION` attribute as written, e.g. `1920x1080`. Empty for audio-only variants.
    pub resolution: String,
    pub frame_rate: f64,
    pub uri: String,
}

impl Variant {
    /// Frame height parsed from the resolution label.
    pub fn height(&self) -> Option<u32> {
        self.resolution
            .split_once('x')
            .and_then(|(_, h)| h.parse().ok())
    }

    fn matches_height(&self, height: u32) -> bool {
        self.resolution.ends_with(&format!("x{height}"))
    }
}

/// Outcome of [`select_variant`].
#[derive(Debug, Clone, PartialEq)]
pub struct VariantChoice {
    pub variant: Variant,
    /// User-facing label, `4K` or `<height>p`.
    pub label: String,
    /// Whether the resolution chain had to step down from the request.
    pub fell_back: bool,
}

/// Order variants by descending bandwidth. Equal bandwidths keep playlist order.
pub fn order_variants(mut variants: Vec<Variant>) -> Vec<Variant> {
    variants.sort_by_key(|v| Reverse(v.bandwidth));
    variants
}

/// `4K` for 2160, `<height>p` for everything else.
pub fn format_resolution(height: u32) -> String {
    if height == 2160 {
        "4K".to_string()
    } else {
        format!("{height}p")
    }
}

fn next_height(height: u32) -> Option<u32> {
    RESOLUTION_FALLBACK
        .iter()
        .find(|(from, _)| *from == height)
        .map(|(_, to)| *to)
}

/// Pick the variant to download for the requested video format.
///
/// `Best` takes the highest-bandwidth variant whatever its size. Any other
/// request walks [`RESOLUTION_FALLBACK`] from the requested height until a
/// variant's resolution ends in `x<height>`.
pub fn select_variant(variants: Vec<Variant>, wanted: VideoFormat) -> Result<VariantChoice> {
    let ordered = order_variants(variants);

    if wanted == VideoFormat::Best {
        let top = ordered.into_iter().next().ok_or(Error::NoVariantAvailable)?;
        let height = top.height().ok_or_else(|| {
            Error::parse(format!("variant {} has no usable RESOLUTION", top.uri))
        })?;
        return Ok(VariantChoice {
            label: format_resolution(height),
            variant: top,
            fell_back: false,
        });
    }

    let requested = wanted.height();
    let mut height = requested;
    loop {
        if let Some(found) = ordered.iter().find(|v| v.matches_height(height)) {
            if height != requested {
                tracing::debug!("No {}p variant, using {}p", requested, height);
            }
            return Ok(VariantChoice {
                variant: found.clone(),
                label: format_resolution(height),
                fell_back: height != requested,
            });
        }
        height = next_height(height).ok_or(Error::NoVariantAvailable)?;
    }
}

fn bitrate_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\w]+(?:_(\d+)k_v\d+)").expect("static pattern compiles"))
}

/// Display bitrate (in Kbps) embedded in an adaptive audio variant URI.
///
/// ```
/// use showtape_media::extract_bitrate;
///
/// assert_eq!(extract_bitrate("audio_256k_v4/index.m3u8").unwrap(), "256");
/// ```
pub fn extract_bitrate(uri: &str) -> Result<String> {
    bitrate_pattern()
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or(Error::NoBitrateMatch)
}
