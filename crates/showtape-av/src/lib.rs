//! # showtape-av
//!
//! ffmpeg integration for the showtape download pipeline.
//!
//! This crate provides functionality for:
//! - Locating the ffmpeg binary (configured path or `PATH`)
//! - Reading a stream's duration from ffmpeg's probe-mode diagnostics
//! - Turning raw chapter marks into non-overlapping intervals and an
//!   `ffmetadata` sidecar
//! - Copying an elementary stream into its final container, with or without
//!   chapters, and piping decrypted audio straight into a container
//!
//! All ffmpeg invocations are blocking child processes. Async callers should
//! run them through `spawn_blocking`.
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use showtape_av::{build_intervals, locate_on_path, probe_duration, write_sidecar, ChapterMark};
//!
//! let ffmpeg = locate_on_path("ffmpeg")?;
//! let duration = probe_duration(&ffmpeg, "show.ts".as_ref())?;
//! let marks = vec![ChapterMark::new(0.0, "Intro"), ChapterMark::new(95.4, "Set 1")];
//! write_sidecar("chapters.txt".as_ref(), &build_intervals(&marks, duration))?;
//! # Ok::<(), showtape_av::Error>(())
//! ```

pub mod chapters;
mod error;
pub mod probe;
pub mod remux;
pub mod tools;

// Re-exports
pub use chapters::{build_intervals, render_ffmetadata, write_sidecar, ChapterInterval, ChapterMark};
pub use error::{Error, Result, Step};
pub use probe::{parse_probe_diagnostics, probe_duration};
pub use remux::{assemble, pipe_to_container};
pub use tools::{check_version, locate_on_path, resolve_tool, ToolStatus};

/// Binary name searched for on `PATH`.
pub const FFMPEG: &str = "ffmpeg";
