//! Showtape-Media: adaptive-streaming manifest interpretation.
//!
//! This crate turns HLS playlist text into the handful of facts the download
//! pipeline needs. It performs no I/O; callers fetch manifest bodies and hand
//! them over as strings.
//!
//! # Modules
//!
//! - `hls` - master/media playlist parsing, variant ordering and selection,
//!   manifest base resolution
//!
//! # Selection rules
//!
//! 1. Variants are ordered by descending bandwidth, ties kept in playlist order
//! 2. "Best" takes the top variant; anything else walks a fixed resolution
//!    fallback chain (1440 → 1080 → 720 → 480)
//! 3. Every relative URI in a manifest resolves against that manifest's
//!    directory and carries its query string, which holds the CDN token

pub mod hls;

pub use hls::{
    extract_bitrate, format_resolution, order_variants, parse_master, parse_media,
    select_variant, ManifestBase, MediaPlaylist, SegmentKey, Variant, VariantChoice,
};
pub use showtape_common::{Error, Result};
