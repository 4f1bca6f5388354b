//! Error types for showtape-av.

use std::fmt;
use std::path::Path;
use std::process::Output;

pub type Result<T> = std::result::Result<T, Error>;

/// Which ffmpeg invocation went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// `ffmpeg -i <input>` run for its diagnostics.
    Probe,
    /// Stream copy into the final container, optionally with chapters.
    Assemble,
    /// Remux of stdin into a container.
    Pipe,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Probe => "probe",
            Self::Assemble => "assemble",
            Self::Pipe => "pipe",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// ffmpeg could not be located or started.
    #[error("ffmpeg not found: {program}")]
    NotFound { program: String },

    /// ffmpeg ran but did not do what was asked. `stderr` is passed on untouched.
    #[error("ffmpeg {step} failed ({status}): {stderr}")]
    Failed {
        step: Step,
        status: String,
        stderr: String,
    },

    /// Probe-mode diagnostics did not have the expected shape.
    #[error("unreadable ffmpeg diagnostics: {0}")]
    Diagnostics(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// There was nothing to remux.
    #[error("no stream data to remux")]
    EmptyStream,
}

impl Error {
    pub fn not_found(program: impl AsRef<Path>) -> Self {
        Self::NotFound {
            program: program.as_ref().display().to_string(),
        }
    }

    /// Build a [`Error::Failed`] from a finished ffmpeg process.
    pub fn failed(step: Step, output: &Output) -> Self {
        Self::Failed {
            step,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn diagnostics(msg: impl Into<String>) -> Self {
        Self::Diagnostics(msg.into())
    }

    /// Map a spawn failure; `NotFound` means the binary is missing.
    pub(crate) fn spawn(program: &Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::not_found(program)
        } else {
            Self::Io(err)
        }
    }
}
