//! Chapter intervals and the `ffmetadata` sidecar.

use crate::Result;
use std::fmt::Write as _;
use std::path::Path;

/// Chapter start reported by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterMark {
    pub start_seconds: f64,
    pub title: String,
}

impl ChapterMark {
    pub fn new(start_seconds: f64, title: impl Into<String>) -> Self {
        Self {
            start_seconds,
            title: title.into(),
        }
    }
}

/// A chapter ready to be written, in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterInterval {
    pub start: u64,
    pub end: u64,
    pub title: String,
}

fn round_secs(value: f64) -> u64 {
    value.round().max(0.0) as u64
}

/// Turn chapter marks into intervals.
///
/// Marks are ordered by start time first. Each interval ends one second
/// before the next mark, and the last one ends at `duration` (or at its own
/// start when that is later). A mark whose successor does not start strictly
/// later, once rounded to whole seconds, is dropped.
pub fn build_intervals(marks: &[ChapterMark], duration: u64) -> Vec<ChapterInterval> {
    let mut ordered: Vec<&ChapterMark> = marks.iter().collect();
    ordered.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));

    let mut intervals = Vec::with_capacity(ordered.len());
    for (i, mark) in ordered.iter().enumerate() {
        let start = round_secs(mark.start_seconds);
        let end = match ordered.get(i + 1).map(|next| round_secs(next.start_seconds)) {
            Some(next) if next <= start => continue,
            Some(next) => next - 1,
            None => duration.max(start),
        };
        intervals.push(ChapterInterval {
            start,
            end,
            title: mark.title.clone(),
        });
    }
    intervals
}

/// Render intervals in ffmpeg's `ffmetadata` format.
pub fn render_ffmetadata(intervals: &[ChapterInterval]) -> String {
    let mut out = String::from(";FFMETADATA1\n");
    for chapter in intervals {
        let _ = write!(
            out,
            "\n[CHAPTER]\nTIMEBASE=1/1\nSTART={}\nEND={}\nTITLE={}\n",
            chapter.start, chapter.end, chapter.title
        );
    }
    out
}

/// Write the `ffmetadata` sidecar, replacing any existing file.
pub fn write_sidecar(path: &Path, intervals: &[ChapterInterval]) -> Result<()> {
    std::fs::write(path, render_ffmetadata(intervals))?;

    #[cfg(feature = "tracing")]
    tracing::debug!("Wrote {} chapters to {:?}", intervals.len(), path);

    Ok(())
}
