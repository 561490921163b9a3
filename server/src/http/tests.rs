use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use super::dto::{ListArtifactsResponse, ListVersionsResponse, MessageResponse};
use super::server::router;
use super::state::AppState;
use crate::store::{CollectionPair, MemoryBackend, StoreConfig, VersionedStore};
use crate::validate::{AcceptAll, Validator, Verdict};

struct RejectAll;

#[async_trait]
impl Validator for RejectAll {
    async fn validate(&self, _content: &[u8]) -> anyhow::Result<Verdict> {
        Ok(Verdict::Rejected("rule group is malformed".to_string()))
    }
}

fn create_test_app_with(validator: Arc<dyn Validator>) -> Router {
    let config = StoreConfig {
        confirm_poll_interval: Duration::from_millis(5),
        confirm_timeout: Duration::from_millis(200),
        ..StoreConfig::default()
    };
    let store = VersionedStore::new(
        Arc::new(MemoryBackend::new()),
        validator,
        config,
        CollectionPair::new("rules-current", "rules-history"),
    );
    router(Arc::new(AppState {
        store: Arc::new(store),
    }))
}

fn create_test_app() -> Router {
    create_test_app_with(Arc::new(AcceptAll))
}

fn put_request(name: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri(format!("/artifacts/{name}"))
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "config-archive");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_put_and_get_artifact() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_request("a.rules", "groups:\n- name: x\n"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let message: MessageResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(message.message.contains("a.rules"));

    let response = app.oneshot(get_request("/artifacts/a.rules")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"groups:\n- name: x\n");
}

#[tokio::test]
async fn test_identical_put_returns_ok_not_accepted() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(put_request("a.rules", "same"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app.oneshot(put_request("a.rules", "same")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let message: MessageResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(message.message.contains("identical"));
}

#[tokio::test]
async fn test_rejected_content_returns_400_with_diagnostics() {
    let app = create_test_app_with(Arc::new(RejectAll));

    let response = app.oneshot(put_request("a.rules", "nonsense")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(body.contains("rule group is malformed"));
}

#[tokio::test]
async fn test_versions_flow() {
    let app = create_test_app();

    app.clone().oneshot(put_request("a.rules", "v1")).await.unwrap();
    app.clone().oneshot(put_request("a.rules", "v2")).await.unwrap();

    let response = app
        .clone()
        .oneshot(get_request("/artifacts/a.rules/versions"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let versions: ListVersionsResponse =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(versions.versions.len(), 1);

    let response = app
        .oneshot(get_request(&format!(
            "/artifacts/a.rules/versions/{}",
            versions.versions[0]
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"v1");
}

#[tokio::test]
async fn test_list_artifacts() {
    let app = create_test_app();

    app.clone().oneshot(put_request("b.rules", "b")).await.unwrap();
    app.clone().oneshot(put_request("a.rules", "a")).await.unwrap();

    let response = app.oneshot(get_request("/artifacts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let list: ListArtifactsResponse =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(list.artifacts, vec!["a.rules", "b.rules"]);
}

#[tokio::test]
async fn test_delete_artifact() {
    let app = create_test_app();

    app.clone().oneshot(put_request("a.rules", "v1")).await.unwrap();
    app.clone().oneshot(put_request("a.rules", "v2")).await.unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/artifacts/a.rules")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let response = app
        .clone()
        .oneshot(get_request("/artifacts/a.rules"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/artifacts/a.rules")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_missing_artifact_is_404() {
    let app = create_test_app();
    let response = app
        .oneshot(get_request("/artifacts/ghost.rules"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_name_is_400() {
    let app = create_test_app();
    let response = app
        .oneshot(get_request("/artifacts/bad%20name"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_version_timestamp_is_400() {
    let app = create_test_app();
    app.clone().oneshot(put_request("a.rules", "v1")).await.unwrap();

    let response = app
        .oneshot(get_request("/artifacts/a.rules/versions/yesterday"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
