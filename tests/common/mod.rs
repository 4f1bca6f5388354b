//! Shared helpers for integration tests.
//!
//! [`TestHarness`] starts a mock catalog/CDN server and builds a config whose
//! API base and output directory point at it and at a temp dir.

#![allow(dead_code)]

use showtape::config::Config;
use showtape::processor::Processor;
use showtape_common::StreamParams;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::MockServer;

pub struct TestHarness {
    pub server: MockServer,
    pub out: TempDir,
    pub config: Config,
}

impl TestHarness {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let out = TempDir::new().unwrap();

        let mut config = Config::default();
        config.api.base_url = format!("{}/", server.uri());
        config.api.player_url = "https://play.example/".to_string();
        config.download.out_path = out.path().to_path_buf();
        config.stream = StreamParams {
            subscription_id: "sub-1".into(),
            plan_access_id: "plan-1".into(),
            user_id: "user-1".into(),
            window_start: 1_700_000_000,
            window_end: 1_800_000_000,
        };

        Self {
            server,
            out,
            config,
        }
    }

    pub fn uri(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    pub fn processor(&self, ffmpeg: PathBuf) -> Processor {
        let client = showtape::http::build_client().unwrap();
        Processor::new(&self.config, client, ffmpeg)
    }

    pub fn out_path(&self) -> &Path {
        self.out.path()
    }
}

/// Write an executable shell script standing in for ffmpeg.
#[cfg(unix)]
pub fn fake_ffmpeg(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("ffmpeg");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Release metadata JSON in the catalog's envelope.
pub fn release_json(body: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "methodName": "catalog.container",
        "responseAvailabilityCode": 0,
        "Response": body,
    })
}
