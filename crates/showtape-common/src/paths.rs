//! Path utilities for naming downloaded files.
//!
//! Catalog titles contain characters that are illegal on common filesystems
//! and can be long enough to hit path limits, so every name derived from
//! metadata goes through [`sanitise`] and, for folders, [`chop`].

use regex::Regex;
use std::sync::OnceLock;

/// Longest release folder name, in bytes.
pub const MAX_FOLDER_NAME: usize = 120;

/// Longest video base name before the resolution suffix, in bytes.
pub const MAX_VIDEO_NAME: usize = 110;

fn illegal_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"[/:*?"><|]"#).expect("static pattern compiles"))
}

/// Replace filesystem-illegal characters with `_` and drop a trailing tab.
///
/// # Examples
///
/// ```
/// use showtape_common::paths::sanitise;
///
/// assert_eq!(sanitise("AC/DC: Live?"), "AC_DC_ Live_");
/// ```
pub fn sanitise(name: &str) -> String {
    let replaced = illegal_chars().replace_all(name, "_");
    replaced.trim_end_matches('\t').to_string()
}

/// Truncate `name` to at most `max` bytes without splitting a character.
///
/// Returns the (possibly shortened) name and whether it was chopped.
pub fn chop(name: &str, max: usize) -> (String, bool) {
    if name.len() <= max {
        return (name.to_string(), false);
    }
    let mut end = max;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    (name[..end].to_string(), true)
}

/// `"<artist> - <container info>"`, with trailing spaces removed from the info.
pub fn release_name(artist: &str, container_info: &str) -> String {
    format!("{} - {}", artist, container_info.trim_end_matches(' '))
}

/// `"NN. <title><ext>"` for the given 1-based track number.
pub fn track_file_name(track_number: usize, title: &str, extension: &str) -> String {
    format!("{:02}. {}{}", track_number, sanitise(title), extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitise_replaces_all_illegal() {
        assert_eq!(sanitise(r#"a/b:c*d?e"f>g<h|i"#), "a_b_c_d_e_f_g_h_i");
        assert_eq!(sanitise("title\t"), "title");
        assert_eq!(sanitise("plain"), "plain");
    }

    #[test]
    fn test_chop_respects_char_boundaries() {
        let (short, chopped) = chop("abc", 10);
        assert_eq!(short, "abc");
        assert!(!chopped);

        let (cut, chopped) = chop("héllo", 2);
        assert_eq!(cut, "h");
        assert!(chopped);
    }

    #[test]
    fn test_release_name_trims_info() {
        assert_eq!(
            release_name("Phish", "1997-11-22 Hampton  "),
            "Phish - 1997-11-22 Hampton"
        );
    }

    #[test]
    fn test_track_file_name() {
        assert_eq!(track_file_name(3, "Tweezer > Reprise", ".flac"), "03. Tweezer _ Reprise.flac");
        assert_eq!(track_file_name(12, "Ghost", ".m4a"), "12. Ghost.m4a");
    }
}
