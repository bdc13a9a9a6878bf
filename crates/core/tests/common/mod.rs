//! Shared helpers for integration tests: fake provider endpoints and logging.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use subgrab_core::AssrtConfig;

pub const TOKEN: &str = "0123456789abcdef0123456789abcdef";

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("subgrab_core=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Bind an ephemeral local port. Returns the listener and its base URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");
    (listener, format!("http://{}", addr))
}

/// Serve `router` on `listener` in the background.
pub fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake server stopped");
    });
}

/// Assrt config pointing at a fake server.
pub fn assrt_config(base: &str) -> AssrtConfig {
    AssrtConfig {
        token: TOKEN.to_string(),
        search_url: format!("{}/v1/sub/search", base),
        detail_url: format!("{}/v1/sub/detail", base),
    }
}

pub fn has_token(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

/// Plain-text subtitle body for a file name.
pub fn subtitle_body(name: &str) -> String {
    format!("1\n00:00:01,000 --> 00:00:02,000\n{}\n", name)
}

/// Response carrying a subtitle body and a `Content-Disposition` header.
pub fn attachment(disposition: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_DISPOSITION, disposition.to_string())],
        body,
    )
        .into_response()
}

/// Write a media file large enough to fingerprint.
pub fn write_media_file(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    let bytes: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, bytes).expect("Failed to write media file");
    path
}

pub fn read_to_string(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read downloaded file")
}
