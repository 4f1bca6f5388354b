//! HLS playlist interpretation.
//!
//! Parsing is delegated to `m3u8-rs`; this module only keeps the attributes
//! the pipeline depends on (`BANDWIDTH`, `RESOLUTION`, segment URIs and the
//! `EXT-X-KEY` tag).

mod base;
mod playlist;
mod variant;

pub use base::ManifestBase;
pub use playlist::{parse_master, parse_media, MediaPlaylist, SegmentKey};
pub use variant::{
    extract_bitrate, format_resolution, order_variants, select_variant, Variant, VariantChoice,
    RESOLUTION_FALLBACK,
};
