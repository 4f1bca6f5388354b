//! Locating the ffmpeg binary.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// What running a tool with its version flag revealed.
#[derive(Debug, Clone)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    /// First line of the version banner.
    pub version: Option<String>,
    /// Where `PATH` lookup found the binary.
    pub resolved: Option<PathBuf>,
}

/// Run `program <flag>` and report whether it answered successfully.
///
/// `program` may be a bare name looked up on `PATH` or a full path.
///
/// ```no_run
/// use showtape_av::check_version;
///
/// let status = check_version("ffmpeg", "-version");
/// if status.available {
///     println!("{:?}", status.version);
/// }
/// ```
pub fn check_version(program: impl AsRef<Path>, flag: &str) -> ToolStatus {
    let program = program.as_ref();
    let name = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());

    let banner = Command::new(program)
        .arg(flag)
        .output()
        .ok()
        .filter(|out| out.status.success())
        .map(|out| String::from_utf8_lossy(&out.stdout).into_owned());

    ToolStatus {
        name,
        available: banner.is_some(),
        version: banner.and_then(|b| b.lines().next().map(str::to_string)),
        resolved: which::which(program).ok(),
    }
}

/// Find `name` on `PATH`.
pub fn locate_on_path(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::not_found(name))
}

/// Resolve a tool, preferring an explicitly configured path that exists.
///
/// A configured path that does not exist is ignored with a warning.
pub fn resolve_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    match configured {
        Some(path) if path.exists() => return Ok(path.to_path_buf()),
        Some(_path) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Configured {} {:?} does not exist, searching PATH", name, _path);
        }
        None => {}
    }

    locate_on_path(name)
}
