//! Duration probing through ffmpeg's diagnostic output.
//!
//! Running `ffmpeg -i <input>` with no output makes ffmpeg print the input's
//! stream summary to stderr and then refuse to continue. That summary is the
//! only thing read here; no ffprobe is required.

use crate::{Error, Result, Step};
use regex::Regex;
use std::path::Path;
use std::process::Command;
use std::sync::OnceLock;

/// Phrase ffmpeg ends its diagnostics with when no output was given.
pub const NO_OUTPUT_PHRASE: &str = "At least one output file must be specified";

/// Exit code ffmpeg uses for the missing-output refusal.
pub const PROBE_EXIT_CODE: i32 = 1;

fn duration_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Duration: ([\d:.]+)").expect("static pattern compiles"))
}

/// Extract a rounded duration in seconds from probe-mode stderr.
///
/// The text must end (ignoring surrounding whitespace) with
/// [`NO_OUTPUT_PHRASE`] and contain a `Duration: H:MM:SS.ss` line.
///
/// ```
/// use showtape_av::parse_probe_diagnostics;
///
/// let stderr = "Input #0, mpegts, from 'a.ts':\n  Duration: 1:02:03.40, start: 1.4\n\
///               At least one output file must be specified\n";
/// assert_eq!(parse_probe_diagnostics(stderr).unwrap(), 3723);
/// ```
pub fn parse_probe_diagnostics(stderr: &str) -> Result<u64> {
    if !stderr.trim().ends_with(NO_OUTPUT_PHRASE) {
        return Err(Error::diagnostics(format!(
            "unexpected probe output:\n{stderr}"
        )));
    }

    let raw = duration_pattern()
        .captures(stderr)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| Error::diagnostics("no duration in probe output"))?;

    parse_timestamp(raw)
}

/// Convert `H:MM:SS.ss` to rounded seconds.
fn parse_timestamp(raw: &str) -> Result<u64> {
    let invalid = || Error::diagnostics(format!("invalid duration: {raw}"));

    let mut parts = raw.splitn(3, ':');
    let (Some(h), Some(m), Some(s)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let hours: u64 = h.parse().map_err(|_| invalid())?;
    let minutes: u64 = m.parse().map_err(|_| invalid())?;
    let seconds: f64 = s.parse().map_err(|_| invalid())?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }

    let total = (hours * 3600 + minutes * 60) as f64 + seconds;
    Ok(total.round() as u64)
}

/// Probe a media file's duration by running `ffmpeg -hide_banner -i <path>`.
///
/// ffmpeg must exit with code 1; anything else (including success) means the
/// tool did not behave as a probe and is reported as a failure.
pub fn probe_duration(ffmpeg: &Path, input: &Path) -> Result<u64> {
    #[cfg(feature = "tracing")]
    tracing::debug!("Probing duration of {:?}", input);

    let output = Command::new(ffmpeg)
        .arg("-hide_banner")
        .arg("-i")
        .arg(input)
        .output()
        .map_err(|e| Error::spawn(ffmpeg, e))?;

    if output.status.code() != Some(PROBE_EXIT_CODE) {
        return Err(Error::failed(Step::Probe, &output));
    }

    parse_probe_diagnostics(&String::from_utf8_lossy(&output.stderr))
}
