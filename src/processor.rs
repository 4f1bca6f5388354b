//! Per-item download flow.
//!
//! Items run strictly in input order and tracks in listed order. A failing
//! item or track is logged with its full error chain and the run moves on.

use crate::catalog::{CatalogClient, Release, StreamRequest, Track};
use crate::config::{Config, DownloadConfig};
use crate::crypto::{cipher_for_method, fetch_key, parse_iv};
use crate::download::{Downloader, TracingProgress};
use crate::manifest::ManifestInterpreter;
use crate::resolver::{probe_candidates, resolve, should_warn_unavailable};
use anyhow::{Context, Result};
use reqwest::Client;
use showtape_av::{assemble, build_intervals, pipe_to_container, probe_duration, write_sidecar};
use showtape_common::paths::{chop, sanitise, track_file_name, MAX_FOLDER_NAME, MAX_VIDEO_NAME};
use showtape_common::{EncodingCandidate, Error, ItemRef, StreamParams};
use std::path::{Path, PathBuf};

/// Outcome counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub succeeded: usize,
    pub failed: usize,
    /// Inputs that were not recognised as catalog items.
    pub invalid: usize,
}

/// What happened to one track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOutcome {
    Downloaded,
    AlreadyExists,
}

/// Runs catalog items through resolution, retrieval and assembly.
pub struct Processor {
    settings: DownloadConfig,
    params: StreamParams,
    client: Client,
    catalog: CatalogClient,
    manifests: ManifestInterpreter,
    downloader: Downloader,
    ffmpeg: PathBuf,
}

/// Run a blocking ffmpeg call off the async runtime and wait for it.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> showtape_av::Result<T> + Send + 'static,
    T: Send + 'static,
{
    Ok(tokio::task::spawn_blocking(f).await??)
}

/// Best-effort delete of an intermediate file.
fn remove_intermediate(path: &Path, what: &str) {
    if let Err(e) = std::fs::remove_file(path) {
        tracing::warn!("Failed to delete {} {:?}: {}", what, path, e);
    }
}

impl Processor {
    pub fn new(config: &Config, client: Client, ffmpeg: PathBuf) -> Self {
        Self {
            settings: config.download.clone(),
            params: config.stream.clone(),
            catalog: CatalogClient::new(client.clone(), &config.api),
            manifests: ManifestInterpreter::new(client.clone()),
            downloader: Downloader::new(
                client.clone(),
                config.api.player_url.clone(),
                config.api.user_agent.clone(),
            ),
            client,
            ffmpeg,
        }
    }

    /// Process every input in order.
    pub async fn run(&self, inputs: &[String]) -> RunReport {
        let mut report = RunReport::default();
        let total = inputs.len();

        for (i, input) in inputs.iter().enumerate() {
            tracing::info!("Item {} of {}:", i + 1, total);

            let Some(item) = ItemRef::parse(input) else {
                tracing::warn!("Invalid URL: {}", input);
                report.invalid += 1;
                continue;
            };

            match self.process_item(&item).await {
                Ok(()) => report.succeeded += 1,
                Err(e) => {
                    tracing::error!("Item failed: {:#}", e);
                    report.failed += 1;
                }
            }
        }

        report
    }

    /// Download one catalog item.
    pub async fn process_item(&self, item: &ItemRef) -> Result<()> {
        tracing::debug!("Processing {}", item);
        let release = self.fetch_release(item.id()).await?;
        match item {
            ItemRef::Release(_) => self.process_release(&release).await,
            ItemRef::Video(_) => self.process_video(&release, false).await,
            ItemRef::Livestream(_) => self.process_video(&release, true).await,
        }
    }

    async fn fetch_release(&self, id: &str) -> Result<Release> {
        self.catalog
            .release(id)
            .await
            .context("Failed to get metadata")
    }

    async fn process_release(&self, release: &Release) -> Result<()> {
        let tracks = release.tracks();

        if release.video_sku().is_some() {
            if tracks.is_empty() {
                if self.settings.skip_videos {
                    tracing::info!("Video-only release, skipped.");
                    return Ok(());
                }
                return self.process_video(release, false).await;
            }
            if self.settings.force_video && !self.settings.skip_videos {
                return self.process_video(release, false).await;
            }
        } else if tracks.is_empty() {
            anyhow::bail!("release has no tracks or videos");
        }

        let name = release.display_name();
        tracing::info!("{}", name);
        let (folder_name, chopped) = chop(&name, MAX_FOLDER_NAME);
        if chopped {
            tracing::info!(
                "Release folder name was chopped because it exceeds {} characters.",
                MAX_FOLDER_NAME
            );
        }

        let folder = self.settings.out_path.join(sanitise(&folder_name));
        tokio::fs::create_dir_all(&folder)
            .await
            .with_context(|| format!("Failed to make release folder {:?}", folder))?;

        let total = tracks.len();
        let mut failed = 0;
        for (i, track) in tracks.iter().enumerate() {
            if let Err(e) = self.process_track(&folder, i + 1, total, track).await {
                match e.downcast_ref::<Error>() {
                    Some(err) if err.is_policy_exhausted() => {
                        tracing::warn!("Track skipped: {:#}", e)
                    }
                    _ => tracing::error!("Track failed: {:#}", e),
                }
                failed += 1;
            }
        }
        if failed > 0 {
            tracing::warn!("{} of {} tracks failed", failed, total);
        }

        Ok(())
    }

    /// Resolve, download and name one track inside `folder`.
    pub async fn process_track(
        &self,
        folder: &Path,
        number: usize,
        total: usize,
        track: &Track,
    ) -> Result<TrackOutcome> {
        let desired = self.settings.format;
        let candidates = probe_candidates(&self.catalog, track.track_id, &self.params)
            .await
            .context("Failed to get track stream metadata")?;
        let resolution = resolve(candidates, desired)?;

        let candidate = if resolution.candidate.is_adaptive() {
            tracing::info!("HLS-only track. Only AAC is available.");
            self.manifests
                .resolve_adaptive_audio(&resolution.candidate)
                .await?
        } else {
            if should_warn_unavailable(&resolution, desired) {
                tracing::warn!("Unavailable in your chosen format.");
            }
            resolution.candidate
        };

        let path = folder.join(track_file_name(
            number,
            &track.song_title,
            candidate.extension(),
        ));
        if tokio::fs::try_exists(&path).await? {
            tracing::info!("Track already exists locally.");
            return Ok(TrackOutcome::AlreadyExists);
        }

        tracing::info!(
            "Downloading track {} of {}: {} - {}",
            number,
            total,
            track.song_title,
            candidate.specs()
        );

        if candidate.is_adaptive() {
            self.download_adaptive_track(&candidate, &path).await?;
        } else {
            self.downloader
                .download_single(candidate.url(), &path, false, &mut TracingProgress::default())
                .await
                .context("Failed to download track")?;
        }

        Ok(TrackOutcome::Downloaded)
    }

    /// Fetch, decrypt and remux an adaptive-only audio track.
    async fn download_adaptive_track(&self, candidate: &EncodingCandidate, path: &Path) -> Result<()> {
        let playlist = self.manifests.resolved_playlist(candidate.url()).await?;
        if playlist.segment_urls.is_empty() {
            return Err(Error::parse("media playlist lists no segments").into());
        }

        let cipher = match (&playlist.key_url, &playlist.key_method) {
            (Some(key_url), Some(method)) => {
                let cipher = cipher_for_method(method)?;
                let iv_tag = playlist
                    .key_iv
                    .as_deref()
                    .ok_or_else(|| Error::parse("key tag has no IV"))?;
                let iv = parse_iv(iv_tag)?;
                let key = fetch_key(&self.client, key_url)
                    .await
                    .context("Failed to get key")?;
                Some((cipher, key, iv))
            }
            _ => None,
        };

        let mut segment_urls = playlist.segment_urls;
        segment_urls.dedup();

        let mut stream = Vec::new();
        let mut progress = TracingProgress::default();
        for url in &segment_urls {
            let data = self.downloader.fetch_bytes(url, &mut progress).await?;
            match &cipher {
                Some((cipher, key, iv)) => stream.extend(cipher.decrypt(&data, key, iv)?),
                None => stream.extend(data),
            }
        }

        let ffmpeg = self.ffmpeg.clone();
        let output = path.to_path_buf();
        blocking(move || pipe_to_container(&ffmpeg, &stream, &output))
            .await
            .context("Failed to put track into its container")
    }

    /// Download a release's video and assemble it into an MP4.
    async fn process_video(&self, release: &Release, livestream: bool) -> Result<()> {
        let chapters = if self.settings.skip_chapters {
            None
        } else {
            release.chapter_marks()
        };

        let name = release.display_name();
        tracing::info!("{}", name);
        let (name, chopped) = chop(&name, MAX_VIDEO_NAME);
        if chopped {
            tracing::info!(
                "Video filename was chopped because it exceeds {} characters.",
                MAX_VIDEO_NAME
            );
        }

        let sku_id = if livestream {
            release.livestream_sku()
        } else {
            release.video_sku()
        }
        .context("no video available")?;

        let manifest_url = self
            .catalog
            .stream_link(
                StreamRequest::Video {
                    container_id: release.container_id,
                    sku_id,
                },
                &self.params,
            )
            .await
            .context("Failed to get video file metadata")?;

        let chosen = self
            .manifests
            .choose_variant(&manifest_url, self.settings.video_format)
            .await
            .context("Failed to get video master manifest")?;
        let label = &chosen.choice.label;

        let stem = sanitise(&format!("{}_{}", name, label));
        let ts_path = self.settings.out_path.join(format!("{stem}.ts"));
        let mp4_path = self.settings.out_path.join(format!("{stem}.mp4"));
        if tokio::fs::try_exists(&mp4_path).await? {
            tracing::info!("Video already exists locally.");
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.settings.out_path).await?;

        let playlist = self
            .manifests
            .resolved_playlist(&chosen.playlist_url)
            .await
            .context("Failed to get video segment URLs")?;
        let Some(first) = playlist.segment_urls.first() else {
            return Err(Error::parse("media playlist lists no segments").into());
        };

        let variant = &chosen.choice.variant;
        let single = playlist.is_single_asset();
        if single {
            tracing::info!(
                "{:.3} FPS, {} Kbps, {} ({})",
                variant.frame_rate,
                variant.bandwidth / 1000,
                label,
                variant.resolution
            );
        } else {
            tracing::info!(
                "{} Kbps, {} ({})",
                variant.bandwidth / 1000,
                label,
                variant.resolution
            );
        }

        let mut progress = TracingProgress::default();
        if single {
            self.downloader
                .download_single(first, &ts_path, true, &mut progress)
                .await
        } else {
            self.downloader
                .download_segments(&playlist.segment_urls, &ts_path, &mut progress)
                .await
        }
        .context("Failed to download video segments")?;

        let sidecar = match chapters {
            Some(marks) => {
                let ffmpeg = self.ffmpeg.clone();
                let input = ts_path.clone();
                let duration = blocking(move || probe_duration(&ffmpeg, &input))
                    .await
                    .context("Failed to get TS duration")?;

                let path = self.settings.out_path.join(format!("{stem}_chapters.txt"));
                write_sidecar(&path, &build_intervals(&marks, duration))
                    .context("Failed to write chapters file")?;
                Some(path)
            }
            None => None,
        };

        tracing::info!("Putting into MP4 container...");
        let ffmpeg = self.ffmpeg.clone();
        let (input, output, chapters) = (ts_path.clone(), mp4_path.clone(), sidecar.clone());
        blocking(move || assemble(&ffmpeg, &input, &output, chapters.as_deref()))
            .await
            .context("Failed to put TS into MP4 container")?;

        if let Some(sidecar) = &sidecar {
            remove_intermediate(sidecar, "chapters file");
        }
        remove_intermediate(&ts_path, "TS");

        Ok(())
    }
}
