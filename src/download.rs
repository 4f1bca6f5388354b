//! Segment retrieval.
//!
//! Two modes: one ranged GET into a file (tracks and single-asset videos),
//! or sequential concatenation of many segments (livestream replays).

use crate::http;
use reqwest::header::{RANGE, REFERER, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use showtape_common::{Error, Result};
use std::path::Path;
use std::time::Instant;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Byte counters for one transfer.
#[derive(Debug, Clone, Copy)]
pub struct DownloadState {
    /// Expected size of the finished file, when the server declared one.
    pub total_bytes: Option<u64>,
    /// Bytes in the destination so far, including resumed ones.
    pub downloaded_bytes: u64,
    pub started_at: Instant,
}

impl DownloadState {
    fn new(total_bytes: Option<u64>, downloaded_bytes: u64) -> Self {
        Self {
            total_bytes,
            downloaded_bytes,
            started_at: Instant::now(),
        }
    }

    /// Completion percentage. Zero when the total is unknown.
    pub fn percentage(&self) -> u8 {
        match self.total_bytes {
            Some(total) if total > 0 => {
                ((self.downloaded_bytes.min(total) * 100) / total) as u8
            }
            _ => 0,
        }
    }
}

/// Receives progress events. Rendering them is up to the implementation.
pub trait ProgressSink: Send {
    fn on_progress(&mut self, state: &DownloadState);

    fn on_segment(&mut self, _index: usize, _total: usize) {}
}

/// Bytes between progress events when the server declared no length.
const UNKNOWN_TOTAL_LOG_STEP: u64 = 1024 * 1024;

/// Emits progress as `tracing` debug events, once per percent, or once per
/// MiB when the total is unknown.
#[derive(Debug, Default)]
pub struct TracingProgress {
    last_percentage: Option<u8>,
    last_logged_bytes: Option<u64>,
}

impl TracingProgress {
    fn should_log(&mut self, state: &DownloadState) -> bool {
        if state.total_bytes.is_none() {
            let due = self
                .last_logged_bytes
                .map_or(true, |last| state.downloaded_bytes >= last + UNKNOWN_TOTAL_LOG_STEP);
            if due {
                self.last_logged_bytes = Some(state.downloaded_bytes);
            }
            return due;
        }
        let pct = state.percentage();
        if self.last_percentage == Some(pct) {
            return false;
        }
        self.last_percentage = Some(pct);
        true
    }
}

impl ProgressSink for TracingProgress {
    fn on_progress(&mut self, state: &DownloadState) {
        if !self.should_log(state) {
            return;
        }
        tracing::debug!(
            "{}% ({} of {} bytes)",
            state.percentage(),
            state.downloaded_bytes,
            state
                .total_bytes
                .map_or_else(|| "unknown".to_string(), |t| t.to_string())
        );
    }

    fn on_segment(&mut self, index: usize, total: usize) {
        tracing::debug!("Segment {} of {}", index, total);
    }
}

async fn copy_body(
    mut response: Response,
    file: &mut File,
    state: &mut DownloadState,
    sink: &mut dyn ProgressSink,
) -> Result<()> {
    while let Some(chunk) = response.chunk().await.map_err(Error::transport)? {
        file.write_all(&chunk).await?;
        state.downloaded_bytes += chunk.len() as u64;
        sink.on_progress(state);
    }
    file.flush().await?;
    Ok(())
}

/// HTTP downloader sharing the run's client.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    referer: String,
    user_agent: String,
}

impl Downloader {
    pub fn new(client: Client, referer: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            referer: referer.into(),
            user_agent: user_agent.into(),
        }
    }

    /// Download `url` into `dest` with one ranged GET.
    ///
    /// With `resume` the request starts at the current size of `dest` and new
    /// bytes are appended. Without it `dest` is truncated and the range starts
    /// at 0. A server that ignores the range and answers 200 restarts the file.
    pub async fn download_single(
        &self,
        url: &str,
        dest: &Path,
        resume: bool,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadState> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(resume)
            .write(true)
            .truncate(!resume)
            .open(dest)
            .await?;
        let offset = if resume { file.metadata().await?.len() } else { 0 };

        if offset > 0 {
            tracing::info!("File already exists locally, resuming from byte {}", offset);
        }

        let response = self
            .client
            .get(url)
            .header(REFERER, &self.referer)
            .header(USER_AGENT, &self.user_agent)
            .header(RANGE, format!("bytes={offset}-"))
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        if status != StatusCode::OK && status != StatusCode::PARTIAL_CONTENT {
            return Err(Error::network(status));
        }

        let mut start = offset;
        if status == StatusCode::OK && offset > 0 {
            tracing::warn!("Server ignored the range request, restarting download");
            file.set_len(0).await?;
            start = 0;
        }

        let total = response.content_length().map(|len| start + len);
        let mut state = DownloadState::new(total, start);
        sink.on_progress(&state);

        copy_body(response, &mut file, &mut state, sink).await?;
        Ok(state)
    }

    /// Concatenate `urls` into `dest`, in order.
    ///
    /// `dest` is truncated first. A failing segment aborts the transfer and
    /// leaves what was written so far on disk.
    pub async fn download_segments(
        &self,
        urls: &[String],
        dest: &Path,
        sink: &mut dyn ProgressSink,
    ) -> Result<DownloadState> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(dest)
            .await?;

        let mut state = DownloadState::new(None, 0);
        for (i, url) in urls.iter().enumerate() {
            sink.on_segment(i + 1, urls.len());
            let response = http::send(self.client.get(url)).await?;
            copy_body(response, &mut file, &mut state, sink).await?;
        }
        Ok(state)
    }

    /// Download `url` fully into memory.
    pub async fn fetch_bytes(&self, url: &str, sink: &mut dyn ProgressSink) -> Result<Vec<u8>> {
        let mut response = http::send(
            self.client
                .get(url)
                .header(REFERER, &self.referer)
                .header(USER_AGENT, &self.user_agent),
        )
        .await?;

        let mut state = DownloadState::new(response.content_length(), 0);
        let mut data = Vec::with_capacity(state.total_bytes.unwrap_or_default() as usize);
        while let Some(chunk) = response.chunk().await.map_err(Error::transport)? {
            data.extend_from_slice(&chunk);
            state.downloaded_bytes += chunk.len() as u64;
            sink.on_progress(&state);
        }
        Ok(data)
    }
}
