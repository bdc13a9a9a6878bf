//! Download orchestration against a fake file server.
//!
//! Covers:
//! - Multi-file all-or-nothing barrier and result ordering
//! - Index-prefixed names keeping candidates apart in one directory
//! - File names from `Content-Disposition`
//! - Timeouts and HTTP failures on payload fetches

mod common;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tempfile::TempDir;
use tokio_test::assert_err;

use subgrab_core::provider::{PayloadTarget, RemoteFile, SubtitleCandidate};
use subgrab_core::testing::{fixtures, MemoryStorage};
use subgrab_core::{Downloader, ErrorKind, FsTempStorage, HttpConfig, TempStorage};

async fn file(Path(name): Path<String>) -> String {
    common::subtitle_body(&name)
}

async fn slow(Path(name): Path<String>) -> String {
    tokio::time::sleep(Duration::from_millis(300)).await;
    common::subtitle_body(&name)
}

async fn missing() -> Response {
    (StatusCode::NOT_FOUND, "gone").into_response()
}

async fn hang() -> String {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late".to_string()
}

async fn disposition(Path(kind): Path<String>) -> Response {
    let header = match kind.as_str() {
        "plain" => r#"attachment; filename="Show.S01E01.srt""#,
        "extended" => r#"attachment; filename="fallback.srt"; filename*=UTF-8''%E4%B8%AD%E6%96%87.srt"#,
        "traversal" => r#"attachment; filename="../../evil.srt""#,
        _ => "attachment",
    };
    common::attachment(header, common::subtitle_body(&kind))
}

/// Fake file server plus a downloader writing into a scratch directory.
struct Harness {
    base: String,
    downloader: Downloader,
    dir: PathBuf,
    _scratch: TempDir,
}

impl Harness {
    async fn new() -> Self {
        Self::with_http(HttpConfig::default()).await
    }

    async fn with_http(http: HttpConfig) -> Self {
        common::init_tracing();
        let (listener, base) = common::bind().await;
        let router = Router::new()
            .route("/files/{name}", get(file))
            .route("/slow/{name}", get(slow))
            .route("/missing", get(missing))
            .route("/hang", get(hang))
            .route("/cd/{kind}", get(disposition))
            .route("/nocd", get(|| async { "no header" }));
        common::spawn(listener, router);

        let scratch = TempDir::new().expect("Failed to create temp dir");
        let storage = Arc::new(FsTempStorage::new(scratch.path().join("subs")));
        let dir = storage.allocate_directory().await.unwrap();
        let downloader = Downloader::new(&http, storage).unwrap();

        Self {
            base,
            downloader,
            dir,
            _scratch: scratch,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    fn header_named(&self, index: usize, path: &str) -> SubtitleCandidate {
        let mut candidate = SubtitleCandidate::new(index, "shooter");
        candidate.target = PayloadTarget::SingleFile {
            file: RemoteFile::from_header(self.url(path)),
        };
        candidate
    }

    fn entries(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

#[tokio::test]
async fn test_single_file_saved_with_index_prefix() {
    let h = Harness::new().await;
    let candidate = fixtures::resolved_candidate(4, "assrt", &h.url("/files/movie.srt"), "movie.srt");

    let paths = h.downloader.download(&candidate, &h.dir).await.unwrap();

    assert_eq!(paths, vec![h.dir.join("[4]movie.srt")]);
    assert_eq!(common::read_to_string(&paths[0]), common::subtitle_body("movie.srt"));
}

#[tokio::test]
async fn test_same_upstream_name_does_not_collide() {
    let h = Harness::new().await;
    let first = fixtures::resolved_candidate(0, "assrt", &h.url("/files/first-cut"), "movie.srt");
    let second = fixtures::resolved_candidate(1, "assrt", &h.url("/files/second-cut"), "movie.srt");

    let a = h.downloader.download(&first, &h.dir).await.unwrap();
    let b = h.downloader.download(&second, &h.dir).await.unwrap();

    assert_ne!(a, b);
    assert_eq!(h.entries(), vec!["[0]movie.srt", "[1]movie.srt"]);
    assert_eq!(common::read_to_string(&a[0]), common::subtitle_body("first-cut"));
    assert_eq!(common::read_to_string(&b[0]), common::subtitle_body("second-cut"));
}

#[tokio::test]
async fn test_multi_file_paths_follow_entry_order() {
    let h = Harness::new().await;
    let slow_url = h.url("/slow/first.srt");
    let fast_url = h.url("/files/second.srt");
    let candidate = fixtures::multi_file_candidate(
        2,
        "assrt",
        &[(slow_url.as_str(), "first.srt"), (fast_url.as_str(), "second.srt")],
    );

    let paths = h.downloader.download(&candidate, &h.dir).await.unwrap();

    assert_eq!(
        paths,
        vec![h.dir.join("[2]first.srt"), h.dir.join("[2]second.srt")]
    );
}

#[tokio::test]
async fn test_multi_file_fails_when_any_file_fails() {
    let h = Harness::new().await;
    let a = h.url("/slow/a.srt");
    let b = h.url("/missing");
    let c = h.url("/files/c.srt");
    let candidate = fixtures::multi_file_candidate(
        0,
        "assrt",
        &[(a.as_str(), "a.srt"), (b.as_str(), "b.srt"), (c.as_str(), "c.srt")],
    );

    let err = assert_err!(h.downloader.download(&candidate, &h.dir).await);

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    // Nothing is saved until every file has been fetched
    assert!(h.entries().is_empty());
}

#[tokio::test]
async fn test_multi_file_with_repeated_leaf_names_keeps_both() {
    let h = Harness::new().await;
    let chs = h.url("/files/chs-body");
    let cht = h.url("/files/cht-body");
    let candidate = fixtures::multi_file_candidate(
        0,
        "assrt",
        &[
            (chs.as_str(), "Season1/chs/ep01.srt"),
            (cht.as_str(), "Season1/cht/ep01.srt"),
        ],
    );

    let paths = h.downloader.download(&candidate, &h.dir).await.unwrap();

    assert_eq!(
        paths,
        vec![
            h.dir.join("[0]Season1_chs_ep01.srt"),
            h.dir.join("[0]Season1_cht_ep01.srt"),
        ]
    );
    assert_eq!(h.entries().len(), 2);
    assert_eq!(common::read_to_string(&paths[0]), common::subtitle_body("chs-body"));
    assert_eq!(common::read_to_string(&paths[1]), common::subtitle_body("cht-body"));
}

#[tokio::test]
async fn test_multi_file_with_duplicate_names_is_malformed() {
    let h = Harness::new().await;
    let mut candidate = SubtitleCandidate::new(3, "shooter");
    candidate.target = PayloadTarget::MultiFile {
        files: vec![
            RemoteFile::from_header(h.url("/cd/plain")),
            RemoteFile::from_header(h.url("/cd/plain")),
        ],
    };

    let err = assert_err!(h.downloader.download(&candidate, &h.dir).await);

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(h.entries().is_empty());
}

#[tokio::test]
async fn test_name_from_content_disposition() {
    let h = Harness::new().await;

    let paths = h
        .downloader
        .download(&h.header_named(0, "/cd/plain"), &h.dir)
        .await
        .unwrap();

    assert_eq!(paths, vec![h.dir.join("[0]Show.S01E01.srt")]);
}

#[tokio::test]
async fn test_extended_content_disposition_wins() {
    let h = Harness::new().await;

    let paths = h
        .downloader
        .download(&h.header_named(1, "/cd/extended"), &h.dir)
        .await
        .unwrap();

    assert_eq!(paths, vec![h.dir.join("[1]中文.srt")]);
}

#[tokio::test]
async fn test_remote_name_cannot_escape_directory() {
    let h = Harness::new().await;

    let paths = h
        .downloader
        .download(&h.header_named(0, "/cd/traversal"), &h.dir)
        .await
        .unwrap();

    assert_eq!(paths, vec![h.dir.join("[0]evil.srt")]);
    assert_eq!(h.entries(), vec!["[0]evil.srt"]);
}

#[tokio::test]
async fn test_missing_content_disposition_is_malformed() {
    let h = Harness::new().await;

    let err = h
        .downloader
        .download(&h.header_named(0, "/nocd"), &h.dir)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    assert!(h.entries().is_empty());
}

#[tokio::test]
async fn test_http_error_on_payload_is_network_failure() {
    let h = Harness::new().await;
    let candidate = fixtures::resolved_candidate(0, "assrt", &h.url("/missing"), "a.srt");

    let err = h.downloader.download(&candidate, &h.dir).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn test_timeout_is_network_failure() {
    let h = Harness::with_http(HttpConfig {
        timeout_secs: 1,
        ..Default::default()
    })
    .await;
    let candidate = fixtures::resolved_candidate(0, "assrt", &h.url("/hang"), "a.srt");

    let err = h.downloader.download(&candidate, &h.dir).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_storage_failure_is_local_io() {
    let h = Harness::new().await;
    let storage = Arc::new(MemoryStorage::new());
    storage.set_fail_saves(true).await;
    let downloader = Downloader::new(&HttpConfig::default(), storage.clone()).unwrap();
    let candidate = fixtures::resolved_candidate(0, "assrt", &h.url("/files/a.srt"), "a.srt");

    let err = downloader.download(&candidate, &h.dir).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::LocalIoFailure);
    assert!(!err.is_retryable());
    assert!(storage.saved().await.is_empty());
}
