//! Track format resolution.
//!
//! The stream-metadata endpoint is asked once per delivery platform. Each
//! returned URL is classified by a fixed fragment table, and the desired
//! format is then looked up along a fixed fallback chain.

use crate::catalog::{CatalogClient, StreamRequest};
use showtape_common::{EncodingCandidate, Error, FormatCode, Result, StreamParams};

/// Delivery platforms probed for every track.
pub const PROBE_PLATFORMS: [u8; 4] = [1, 4, 7, 10];

/// URL fragment, specs, extension, format. First match wins, so `.mqa24/`
/// has to stay ahead of `.flac?`.
const QUALITY_TABLE: &[(&str, &str, &str, FormatCode)] = &[
    (".alac16/", "16-bit / 44.1 kHz ALAC", ".m4a", FormatCode::Alac16),
    (".flac16/", "16-bit / 44.1 kHz FLAC", ".flac", FormatCode::Flac16),
    (".mqa24/", "24-bit / 48 kHz MQA", ".flac", FormatCode::Mqa24),
    (".flac?", "FLAC", ".flac", FormatCode::Flac16),
    (".s360/", "360 Reality Audio", ".mp4", FormatCode::Immersive),
    (".aac150/", "150 Kbps AAC", ".m4a", FormatCode::Aac150),
    (".m4a?", "AAC", ".m4a", FormatCode::Aac150),
    (".m3u8?", "", ".m4a", FormatCode::AdaptiveAac),
];

/// Format to try when the current one is not offered.
const FORMAT_FALLBACK: &[(FormatCode, FormatCode)] = &[
    (FormatCode::Alac16, FormatCode::Flac16),
    (FormatCode::Flac16, FormatCode::Aac150),
    (FormatCode::Mqa24, FormatCode::Flac16),
    (FormatCode::Immersive, FormatCode::Mqa24),
];

/// Classify a stream URL into an encoding candidate.
pub fn classify(url: &str) -> Option<EncodingCandidate> {
    QUALITY_TABLE
        .iter()
        .find(|(fragment, ..)| url.contains(fragment))
        .map(|(_, specs, ext, format)| EncodingCandidate::new(*specs, *ext, url, *format))
}

/// Next format in the fallback chain.
pub fn fallback_format(format: FormatCode) -> Option<FormatCode> {
    FORMAT_FALLBACK
        .iter()
        .find(|(from, _)| *from == format)
        .map(|(_, to)| *to)
}

/// `desired` followed by every format the chain reaches from it.
pub fn fallback_chain(desired: FormatCode) -> impl Iterator<Item = FormatCode> {
    std::iter::successors(Some(desired), |f| fallback_format(*f))
}

/// The candidate chosen for a track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub candidate: EncodingCandidate,
    /// The chosen format differs from the one asked for.
    pub used_fallback: bool,
}

/// Choose one candidate for `desired`.
///
/// When every candidate is an adaptive manifest the first one is taken as is;
/// its variant still has to be resolved.
pub fn resolve(candidates: Vec<EncodingCandidate>, desired: FormatCode) -> Result<Resolution> {
    if candidates.is_empty() {
        return Err(Error::NoUsableFormat);
    }

    if candidates.iter().all(EncodingCandidate::is_adaptive) {
        let candidate = candidates.into_iter().next().ok_or(Error::NoUsableFormat)?;
        return Ok(Resolution {
            candidate,
            used_fallback: false,
        });
    }

    for format in fallback_chain(desired) {
        if let Some(found) = candidates.iter().find(|c| c.format() == format) {
            return Ok(Resolution {
                candidate: found.clone(),
                used_fallback: format != desired,
            });
        }
    }

    Err(Error::NoMatchingFormat)
}

/// Whether the user should be told their format was unavailable.
///
/// Asking for the best available format never warns.
pub fn should_warn_unavailable(resolution: &Resolution, desired: FormatCode) -> bool {
    resolution.used_fallback && !desired.is_best_available()
}

/// Query every probe platform and classify what comes back.
///
/// Unrecognised URLs are logged and skipped. An empty stream link fails the
/// whole probe.
pub async fn probe_candidates(
    catalog: &CatalogClient,
    track_id: u64,
    params: &StreamParams,
) -> Result<Vec<EncodingCandidate>> {
    let mut candidates = Vec::with_capacity(PROBE_PLATFORMS.len());

    for platform in PROBE_PLATFORMS {
        let url = catalog
            .stream_link(StreamRequest::Track { track_id, platform }, params)
            .await?;

        match classify(&url) {
            Some(candidate) => {
                tracing::debug!("Platform {} offers {}", platform, candidate.format());
                candidates.push(candidate);
            }
            None => tracing::warn!("The API returned an unsupported format, URL: {}", url),
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn candidate(url: &str) -> EncodingCandidate {
        classify(url).unwrap()
    }

    #[test]
    fn test_classify_table() {
        let cases = [
            ("https://cdn/x.alac16/a.m4a?t=1", FormatCode::Alac16, ".m4a"),
            ("https://cdn/x.flac16/a.flac?t=1", FormatCode::Flac16, ".flac"),
            ("https://cdn/x.mqa24/a.flac?t=1", FormatCode::Mqa24, ".flac"),
            ("https://cdn/a.flac?t=1", FormatCode::Flac16, ".flac"),
            ("https://cdn/x.s360/a.mp4?t=1", FormatCode::Immersive, ".mp4"),
            ("https://cdn/x.aac150/a.m4a?t=1", FormatCode::Aac150, ".m4a"),
            ("https://cdn/a.m4a?t=1", FormatCode::Aac150, ".m4a"),
            ("https://cdn/a/master.m3u8?t=1", FormatCode::AdaptiveAac, ".m4a"),
        ];
        for (url, format, ext) in cases {
            let c = candidate(url);
            assert_eq!(c.format(), format, "{url}");
            assert_eq!(c.extension(), ext, "{url}");
            assert_eq!(c.url(), url);
        }
    }

    #[test]
    fn test_mqa_wins_over_plain_flac() {
        let c = candidate("https://cdn/x.mqa24/track.flac?t=1");
        assert_eq!(c.specs(), "24-bit / 48 kHz MQA");
    }

    #[test]
    fn test_classify_unknown() {
        assert!(classify("https://cdn/a.ogg?t=1").is_none());
    }

    #[test]
    fn test_chain() {
        let chain: Vec<_> = fallback_chain(FormatCode::Immersive).collect();
        assert_eq!(
            chain,
            [
                FormatCode::Immersive,
                FormatCode::Mqa24,
                FormatCode::Flac16,
                FormatCode::Aac150
            ]
        );
        assert_eq!(fallback_chain(FormatCode::Aac150).count(), 1);
    }

    #[test]
    fn test_resolve_exact() {
        let candidates = vec![
            candidate("https://cdn/x.alac16/a?t"),
            candidate("https://cdn/x.flac16/a?t"),
        ];
        let res = resolve(candidates, FormatCode::Flac16).unwrap();
        assert_eq!(res.candidate.format(), FormatCode::Flac16);
        assert!(!res.used_fallback);
    }

    #[test]
    fn test_resolve_falls_back() {
        let candidates = vec![
            candidate("https://cdn/x.aac150/a?t"),
            candidate("https://cdn/x.flac16/a?t"),
        ];
        let res = resolve(candidates.clone(), FormatCode::Mqa24).unwrap();
        assert_eq!(res.candidate.format(), FormatCode::Flac16);
        assert!(res.used_fallback);
        assert!(should_warn_unavailable(&res, FormatCode::Mqa24));

        let res = resolve(candidates, FormatCode::Immersive).unwrap();
        assert_eq!(res.candidate.format(), FormatCode::Flac16);
        assert!(!should_warn_unavailable(&res, FormatCode::Immersive));
    }

    #[test]
    fn test_resolve_stays_in_reachable_set() {
        let pool = [
            "https://cdn/x.alac16/a?t",
            "https://cdn/x.flac16/a?t",
            "https://cdn/x.mqa24/a?t",
            "https://cdn/x.s360/a?t",
            "https://cdn/x.aac150/a?t",
        ];
        for desired in 1..=5u8 {
            let desired = FormatCode::try_from(desired).unwrap();
            let reachable: Vec<_> = fallback_chain(desired).collect();
            // Every non-empty subset of the pool.
            for mask in 1..(1u32 << pool.len()) {
                let candidates: Vec<_> = pool
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, url)| candidate(url))
                    .collect();
                match resolve(candidates, desired) {
                    Ok(res) => assert!(reachable.contains(&res.candidate.format())),
                    Err(e) => assert_matches!(e, Error::NoMatchingFormat),
                }
            }
        }
    }

    #[test]
    fn test_resolve_empty() {
        assert_matches!(
            resolve(Vec::new(), FormatCode::Flac16),
            Err(Error::NoUsableFormat)
        );
    }

    #[test]
    fn test_resolve_exhausted() {
        let candidates = vec![candidate("https://cdn/x.alac16/a?t")];
        assert_matches!(
            resolve(candidates, FormatCode::Aac150),
            Err(Error::NoMatchingFormat)
        );
    }

    #[test]
    fn test_resolve_adaptive_only() {
        let candidates = vec![
            candidate("https://cdn/one/master.m3u8?t=1"),
            candidate("https://cdn/two/master.m3u8?t=1"),
        ];
        let res = resolve(candidates, FormatCode::Alac16).unwrap();
        assert!(res.candidate.is_adaptive());
        assert!(res.candidate.url().contains("/one/"));
        assert!(!res.used_fallback);
    }

    #[test]
    fn test_mixed_adaptive_uses_chain() {
        let candidates = vec![
            candidate("https://cdn/one/master.m3u8?t=1"),
            candidate("https://cdn/x.flac16/a?t"),
        ];
        let res = resolve(candidates, FormatCode::Flac16).unwrap();
        assert_eq!(res.candidate.format(), FormatCode::Flac16);
    }
}
