//! Container assembly with stream copy.

use crate::{Error, Result, Step};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn check_status(step: Step, output: &Output) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::failed(step, output))
    }
}

/// Copy an elementary stream into `output`, optionally attaching chapters.
///
/// With a chapter sidecar the command is
/// `ffmpeg -hide_banner -i <input> -f ffmetadata -i <chapters> -map_metadata 1 -c copy <output>`.
pub fn assemble(ffmpeg: &Path, input: &Path, output: &Path, chapters: Option<&Path>) -> Result<()> {
    #[cfg(feature = "tracing")]
    tracing::debug!("Assembling {:?} -> {:?} (chapters: {:?})", input, output, chapters);

    let mut cmd = Command::new(ffmpeg);
    cmd.arg("-hide_banner").arg("-i").arg(input);
    if let Some(chapters) = chapters {
        cmd.args(["-f", "ffmetadata", "-i"])
            .arg(chapters)
            .args(["-map_metadata", "1"]);
    }
    cmd.args(["-c", "copy"]).arg(output);

    let result = cmd.output().map_err(|e| Error::spawn(ffmpeg, e))?;
    check_status(Step::Assemble, &result)
}

/// Feed an in-memory transport stream to ffmpeg and copy its audio into `output`.
pub fn pipe_to_container(ffmpeg: &Path, data: &[u8], output: &Path) -> Result<()> {
    if data.is_empty() {
        return Err(Error::EmptyStream);
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("Piping {} bytes into {:?}", data.len(), output);

    let mut child = Command::new(ffmpeg)
        .args(["-i", "pipe:", "-c:a", "copy"])
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::spawn(ffmpeg, e))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| Error::Io(std::io::Error::other("ffmpeg stdin unavailable")))?;

    // stderr must be drained while stdin is written or a chatty ffmpeg blocks both ends.
    let (written, result) = std::thread::scope(|scope| {
        let writer = scope.spawn(move || {
            let written = stdin.write_all(data);
            drop(stdin);
            written
        });
        let result = child.wait_with_output();
        (writer.join(), result)
    });

    let output = result?;
    match written {
        Ok(Ok(())) => {}
        // ffmpeg closed its input early; its exit status says why.
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
        Ok(Err(e)) => return Err(Error::Io(e)),
        Err(_) => {
            return Err(Error::Io(std::io::Error::other(
                "stdin writer thread panicked",
            )))
        }
    }

    check_status(Step::Pipe, &output)
}
