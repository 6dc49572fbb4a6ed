#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use std::sync::Arc;
use tempfile::TempDir;

use file_drop::{models::public_url::PublicUrl, services, utils, AppState};

pub const BOUNDARY: &str = "----FileDropTestBoundary7MA4YWxkTrZu0gW";
pub const TEST_HOST: &str = "192.168.1.42:5000";

/// A router over a temporary upload directory. Keep the TempDir alive for
/// as long as the router is used.
pub struct TestApp {
    pub router: Router,
    pub public_url: Arc<PublicUrl>,
    pub upload_dir: TempDir,
}

/// Setup a test application with temporary storage
pub fn setup_test_app() -> TestApp {
    let upload_dir = TempDir::new().unwrap();

    let config = utils::config::AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: upload_dir.path().to_path_buf(),
        tunnel_enabled: false,
        ..Default::default()
    };

    let storage = services::file_storage::FileStorageService::new(upload_dir.path())
        .expect("Failed to create storage service");

    let public_url = Arc::new(PublicUrl::new());
    let app_state = AppState::new(config, storage, public_url.clone());

    TestApp {
        router: file_drop::router(app_state),
        public_url,
        upload_dir,
    }
}

/// Build a multipart body with one file field
pub fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build a multipart body holding only a text field
pub fn multipart_text_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"\r\n\r\n{value}\r\n--{b}--\r\n",
        b = BOUNDARY
    )
    .into_bytes()
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .uri("/")
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(header::HOST, TEST_HOST)
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("GET")
        .header(header::HOST, TEST_HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: axum::response::Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
