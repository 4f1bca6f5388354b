//! Format resolution against a mock stream-metadata endpoint.

mod common;

use assert_matches::assert_matches;
use common::TestHarness;
use showtape::catalog::{CatalogClient, StreamRequest};
use showtape::resolver::{probe_candidates, resolve, PROBE_PLATFORMS};
use showtape_common::{Error, FormatCode};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn catalog(h: &TestHarness) -> CatalogClient {
    CatalogClient::new(showtape::http::build_client().unwrap(), &h.config.api)
}

async fn mount_platform(h: &TestHarness, platform: u8, link: &str) {
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .and(query_param("platformID", platform.to_string()))
        .and(query_param("trackID", "4242"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "streamLink": link })),
        )
        .expect(1)
        .mount(&h.server)
        .await;
}

#[tokio::test]
async fn probes_every_platform_and_skips_unknown_formats() {
    let h = TestHarness::new().await;
    mount_platform(&h, 1, "https://cdn.example/t.alac16/a.m4a?tok=1").await;
    mount_platform(&h, 4, "https://cdn.example/t.flac16/a.flac?tok=1").await;
    mount_platform(&h, 7, "https://cdn.example/t.ogg?tok=1").await;
    mount_platform(&h, 10, "https://cdn.example/t.s360/a.mp4?tok=1").await;

    let candidates = probe_candidates(&catalog(&h), 4242, &h.config.stream)
        .await
        .unwrap();
    let formats: Vec<_> = candidates.iter().map(|c| c.format()).collect();
    assert_eq!(
        formats,
        [FormatCode::Alac16, FormatCode::Flac16, FormatCode::Immersive]
    );

    let resolution = resolve(candidates, FormatCode::Mqa24).unwrap();
    assert_eq!(resolution.candidate.format(), FormatCode::Flac16);
    assert!(resolution.used_fallback);
}

#[tokio::test]
async fn sends_stream_params_and_user_agent() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .and(query_param("app", "1"))
        .and(query_param("subscriptionID", "sub-1"))
        .and(query_param("subCostplanIDAccessList", "plan-1"))
        .and(query_param("nn_userID", "user-1"))
        .and(query_param("startDateStamp", "1700000000"))
        .and(query_param("endDateStamp", "1800000000"))
        .and(header("user-agent", h.config.api.stream_user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "streamLink": "https://cdn/x.m4a?t" })),
        )
        .expect(PROBE_PLATFORMS.len() as u64)
        .mount(&h.server)
        .await;

    let candidates = probe_candidates(&catalog(&h), 4242, &h.config.stream)
        .await
        .unwrap();
    assert_eq!(candidates.len(), PROBE_PLATFORMS.len());
}

#[tokio::test]
async fn only_unknown_formats_is_no_usable_format() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "streamLink": "https://cdn/a.wav?t" })),
        )
        .expect(PROBE_PLATFORMS.len() as u64)
        .mount(&h.server)
        .await;

    let candidates = probe_candidates(&catalog(&h), 1, &h.config.stream)
        .await
        .unwrap();
    assert!(candidates.is_empty());
    assert_matches!(
        resolve(candidates, FormatCode::Flac16),
        Err(Error::NoUsableFormat)
    );
}

#[tokio::test]
async fn empty_stream_link_is_no_stream_url() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "streamLink": "" })))
        .mount(&h.server)
        .await;

    let err = catalog(&h)
        .stream_link(
            StreamRequest::Track {
                track_id: 1,
                platform: 1,
            },
            &h.config.stream,
        )
        .await
        .unwrap_err();
    assert_matches!(err, Error::NoStreamUrl);
}

#[tokio::test]
async fn non_success_status_carries_status_text() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&h.server)
        .await;

    let err = probe_candidates(&catalog(&h), 1, &h.config.stream)
        .await
        .unwrap_err();
    assert_matches!(&err, Error::Network { .. });
    assert_eq!(err.to_string(), "403 Forbidden");
}

#[tokio::test]
async fn video_stream_request_uses_sku() {
    let h = TestHarness::new().await;
    Mock::given(method("GET"))
        .and(path("/bigriver/subPlayer.aspx"))
        .and(query_param("skuId", "555"))
        .and(query_param("containerID", "23329"))
        .and(query_param("chap", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "streamLink": "https://cdn/v/master.m3u8?t=1" })),
        )
        .expect(1)
        .mount(&h.server)
        .await;

    let link = catalog(&h)
        .stream_link(
            StreamRequest::Video {
                container_id: 23329,
                sku_id: 555,
            },
            &h.config.stream,
        )
        .await
        .unwrap();
    assert_eq!(link, "https://cdn/v/master.m3u8?t=1");
}
