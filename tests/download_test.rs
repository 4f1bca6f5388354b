//! Segment retrieval against a mock CDN.

use assert_matches::assert_matches;
use showtape::download::{DownloadState, Downloader, ProgressSink, TracingProgress};
use showtape_common::Error;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn downloader() -> Downloader {
    Downloader::new(
        showtape::http::build_client().unwrap(),
        "https://play.example/",
        "test-agent",
    )
}

#[derive(Default)]
struct Recorder {
    segments: Vec<(usize, usize)>,
    last: Option<u64>,
}

impl ProgressSink for Recorder {
    fn on_progress(&mut self, state: &DownloadState) {
        self.last = Some(state.downloaded_bytes);
    }

    fn on_segment(&mut self, index: usize, total: usize) {
        self.segments.push((index, total));
    }
}

#[tokio::test]
async fn resume_appends_remaining_bytes() {
    let server = MockServer::start().await;
    let full: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
    let have = 1000;

    Mock::given(method("GET"))
        .and(path("/track.flac"))
        .and(header("range", format!("bytes={have}-").as_str()))
        .and(header("referer", "https://play.example/"))
        .and(header("user-agent", "test-agent"))
        .respond_with(ResponseTemplate::new(206).set_body_bytes(full[have..].to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("track.flac");
    std::fs::write(&dest, &full[..have]).unwrap();

    let mut sink = Recorder::default();
    let state = downloader()
        .download_single(&format!("{}/track.flac", server.uri()), &dest, true, &mut sink)
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), full);
    assert_eq!(state.downloaded_bytes, full.len() as u64);
    assert_eq!(state.total_bytes, Some(full.len() as u64));
    assert_eq!(sink.last, Some(full.len() as u64));
}

#[tokio::test]
async fn ignored_range_restarts_file() {
    let server = MockServer::start().await;
    let full = b"the whole file from the start".to_vec();

    Mock::given(method("GET"))
        .and(path("/video.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(full.clone()))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("video.ts");
    std::fs::write(&dest, b"stale partial").unwrap();

    let state = downloader()
        .download_single(
            &format!("{}/video.ts", server.uri()),
            &dest,
            true,
            &mut TracingProgress::default(),
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(&dest).unwrap(), full);
    assert_eq!(state.downloaded_bytes, full.len() as u64);
}

#[tokio::test]
async fn fresh_download_truncates_and_requests_from_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/track.m4a"))
        .and(header("range", "bytes=0-"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"fresh".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("track.m4a");
    std::fs::write(&dest, b"old contents that are longer").unwrap();

    downloader()
        .download_single(
            &format!("{}/track.m4a", server.uri()),
            &dest,
            false,
            &mut TracingProgress::default(),
        )
        .await
        .unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"fresh");
}

#[tokio::test]
async fn single_download_rejects_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let err = downloader()
        .download_single(
            &format!("{}/track.flac", server.uri()),
            &dir.path().join("t.flac"),
            false,
            &mut TracingProgress::default(),
        )
        .await
        .unwrap_err();
    assert_matches!(&err, Error::Network { .. });
    assert_eq!(err.to_string(), "403 Forbidden");
}

#[tokio::test]
async fn segments_concatenate_in_order() {
    let server = MockServer::start().await;
    for (name, body) in [("a.ts", "AAA"), ("b.ts", "BB"), ("c.ts", "C")] {
        Mock::given(method("GET"))
            .and(path(format!("/seg/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;
    }

    let urls: Vec<String> = ["a.ts", "b.ts", "c.ts"]
        .iter()
        .map(|n| format!("{}/seg/{n}", server.uri()))
        .collect();
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.ts");

    let mut sink = Recorder::default();
    let state = downloader()
        .download_segments(&urls, &dest, &mut sink)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "AAABBC");
    assert_eq!(state.downloaded_bytes, 6);
    assert_eq!(sink.segments, vec![(1, 3), (2, 3), (3, 3)]);
}

#[tokio::test]
async fn failing_segment_aborts_and_keeps_partial_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seg/a.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("AAA"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seg/b.ts"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/seg/c.ts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("C"))
        .expect(0)
        .mount(&server)
        .await;

    let urls: Vec<String> = ["a.ts", "b.ts", "c.ts"]
        .iter()
        .map(|n| format!("{}/seg/{n}", server.uri()))
        .collect();
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("out.ts");

    let err = downloader()
        .download_segments(&urls, &dest, &mut TracingProgress::default())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "500 Internal Server Error");
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "AAA");
}

#[tokio::test]
async fn fetch_bytes_reads_whole_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/seg.aac"))
        .and(header("referer", "https://play.example/"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![7u8; 300]))
        .mount(&server)
        .await;

    let data = downloader()
        .fetch_bytes(
            &format!("{}/seg.aac", server.uri()),
            &mut TracingProgress::default(),
        )
        .await
        .unwrap();
    assert_eq!(data, vec![7u8; 300]);
}
