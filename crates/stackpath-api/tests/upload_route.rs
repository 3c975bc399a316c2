use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use stackpath_api::{app::build_router, config::Config, state::AppState, storage::FsObjectStore};
use stackpath_llm::{ChatClient, ChatRequest, LlmEventStream};
use stackpath_mcp::ToolRegistry;

struct NoopChatClient;

#[async_trait::async_trait]
impl ChatClient for NoopChatClient {
    async fn chat_stream(&self, _request: ChatRequest) -> anyhow::Result<LlmEventStream> {
        Ok(Box::pin(futures::stream::empty()))
    }
}

fn test_state(dir: &Path) -> Arc<AppState> {
    let config: Config = serde_json::from_str("{}").unwrap();
    Arc::new(AppState::new(
        config,
        Arc::new(NoopChatClient),
        Arc::new(ToolRegistry::new(dir.join("tools.json"))),
        Arc::new(FsObjectStore::new(dir.join("uploads"), "/uploads")),
    ))
}

fn multipart_body(boundary: &str, name: &str, mime: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

async fn post_upload(dir: &Path, name: &str, mime: &str, payload: &[u8]) -> (StatusCode, serde_json::Value, bool) {
    let app = build_router(test_state(dir));

    let boundary = "stackpathboundary";
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/upload")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(multipart_body(boundary, name, mime, payload)))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let has_request_id = response.headers().contains_key("x-request-id");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json, has_request_id)
}

fn temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("stackpath-api-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[tokio::test]
async fn upload_accepts_files_beyond_the_default_body_cap() {
    let dir = temp_dir();

    // 3MB png: over axum's stock 2MB body limit, under the 5MB image cap.
    let payload = vec![0u8; 3 * 1024 * 1024];
    let (status, json, has_request_id) = post_upload(&dir, "big.png", "image/png", &payload).await;

    assert_eq!(status, StatusCode::OK, "body: {json}");
    assert_eq!(json["success"], true);
    assert_eq!(json["size"], 3 * 1024 * 1024);
    assert_eq!(json["type"], "image/png");
    assert!(has_request_id, "logging middleware must tag responses");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn oversized_file_still_fails_validation_not_the_body_cap() {
    let dir = temp_dir();

    // 6MB png: admitted by the raised body limit, rejected by the allow-list.
    let payload = vec![0u8; 6 * 1024 * 1024];
    let (status, json, _) = post_upload(&dir, "huge.png", "image/png", &payload).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "size");

    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn disallowed_type_is_rejected_with_the_field_marker() {
    let dir = temp_dir();

    let (status, json, _) = post_upload(&dir, "movie.mp4", "video/mp4", b"x").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["field"], "type");

    std::fs::remove_dir_all(&dir).ok();
}
