//! Catalog item references parsed from player URLs.
//!
//! Only item shapes that resolve to downloadable media are recognised.
//! Browse pages (artists, playlists) are deliberately not matched.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// A downloadable catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemRef {
    /// A release container (album or show) by container id.
    Release(String),
    /// An on-demand video, addressed by its container id.
    Video(String),
    /// A livestream or webcast replay, addressed by its container id.
    Livestream(String),
}

#[derive(Clone, Copy)]
enum Kind {
    Release,
    Video,
    Livestream,
}

/// Ordered URL patterns; the first capture group is the container id.
const PATTERNS: &[(&str, Kind)] = &[
    (r"^https://play\.nugs\.net/release/(\d+)$", Kind::Release),
    (r"^https://play\.nugs\.net/#/videos/artist/\d+/.+/(\d+)$", Kind::Video),
    (r"^https://play\.nugs\.net/library/webcast/(\d+)$", Kind::Video),
    (r"^https://play\.nugs\.net/livestream/(\d+)/exclusive$", Kind::Livestream),
    (r"^https://play\.nugs\.net/watch/livestreams/exclusive/(\d+)$", Kind::Livestream),
    (r"^https://play\.nugs\.net/#/my-webcasts/\d+-(\d+)-\d+-\d+$", Kind::Livestream),
    (r"^(\d+)$", Kind::Release),
];

fn compiled() -> &'static [(Regex, Kind)] {
    static COMPILED: OnceLock<Vec<(Regex, Kind)>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|(pattern, kind)| Regex::new(pattern).ok().map(|re| (re, *kind)))
            .collect()
    })
}

impl ItemRef {
    /// Classify a URL or bare container id. Returns `None` for unsupported shapes.
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().trim_end_matches('/');
        compiled().iter().find_map(|(re, kind)| {
            let id = re.captures(input)?.get(1)?.as_str().to_string();
            Some(match kind {
                Kind::Release => Self::Release(id),
                Kind::Video => Self::Video(id),
                Kind::Livestream => Self::Livestream(id),
            })
        })
    }

    /// Container id of the item.
    pub fn id(&self) -> &str {
        match self {
            Self::Release(id) | Self::Video(id) | Self::Livestream(id) => id,
        }
    }
}

impl fmt::Display for ItemRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release(id) => write!(f, "release {id}"),
            Self::Video(id) => write!(f, "video {id}"),
            Self::Livestream(id) => write!(f, "livestream {id}"),
        }
    }
}
