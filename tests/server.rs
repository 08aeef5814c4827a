//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use claims_dashboard::loader;
use claims_dashboard::server::{router, AppState};
use http_body_util::BodyExt;
use std::io::Write;
use std::path::PathBuf;
use tower::ServiceExt;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/claims.csv")
}

async fn get(state: AppState, uri: &str) -> (StatusCode, String) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

fn image_payloads(html: &str) -> Vec<&str> {
    html.split("data:image/png;base64,")
        .skip(1)
        .map(|rest| rest.split('"').next().unwrap_or_default())
        .collect()
}

#[tokio::test]
async fn index_renders_cards_and_charts() {
    let (records, _) = loader::load_claims(fixture_path()).unwrap();
    let (status, html) = get(AppState::new(records), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("40.0%"));
    assert!(html.contains("US$ 100,000"));
    assert!(html.contains("US$ 5,500.0"));

    let images = image_payloads(&html);
    assert_eq!(images.len(), 8);
    assert!(images.iter().all(|b64| b64.starts_with("iVBORw0KGgo")));
}

#[tokio::test]
async fn reload_mode_reads_the_file_per_request() {
    let (status, html) = get(AppState::reloading(fixture_path()), "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("40.0%"));
}

#[tokio::test]
async fn dataset_without_fraud_is_a_generic_500() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let text = std::fs::read_to_string(fixture_path()).unwrap().replace(",Y\n", ",N\n");
    file.write_all(text.as_bytes()).unwrap();
    let (records, _) = loader::load_claims(file.path()).unwrap();

    let (status, body) = get(AppState::new(records), "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "Internal Server Error");
}

#[tokio::test]
async fn reload_of_missing_file_is_a_500() {
    let dir = tempfile::tempdir().unwrap();
    let (status, _) = get(AppState::reloading(dir.path().join("gone.csv")), "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn other_paths_are_not_found() {
    let (records, _) = loader::load_claims(fixture_path()).unwrap();
    let (status, _) = get(AppState::new(records), "/charts").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
