//! Receipt upload tests
//!
//! Tests cover:
//! - Multipart upload stored on disk and served back from /files
//! - Required form fields
//! - Upload size limit
//! - No file left behind when the receipt row cannot be written

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use bic_common::config::IntakeConfig;
use bic_common::db::init_database;
use bic_intake::{build_router, AppState, MAX_UPLOAD_BYTES};
use serde_json::Value;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tower::util::ServiceExt;

const BOUNDARY: &str = "RECEIPTBOUNDARY";

async fn setup_app_with_pool() -> (Router, PathBuf, SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let config = IntakeConfig::with_data_dir(dir.path());
    let receipts_dir = config.receipts_dir();

    let pool = init_database(&config.database_path())
        .await
        .expect("Should create test database");
    let state = AppState::new(pool.clone(), config).expect("Should build state");

    (build_router(state), receipts_dir, pool, dir)
}

async fn setup_app() -> (Router, PathBuf, TempDir) {
    let (app, receipts_dir, _pool, dir) = setup_app_with_pool().await;
    (app, receipts_dir, dir)
}

/// Regular files anywhere under `dir`
fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n", name, value)
                        .as_bytes(),
                );
            }
            Part::File(filename, content_type, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        filename, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn extract_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).expect("Should parse JSON")
}

#[tokio::test]
async fn test_upload_receipt_and_fetch_file() {
    let (app, receipts_dir, _dir) = setup_app().await;

    let request = multipart_request(
        "/api/receipts",
        &[
            Part::Text("company_context", "xes"),
            Part::Text("uploader_note", "  Home Depot run  "),
            Part::Text("related_quote_id", ""),
            Part::File("home depot (1).txt", "text/plain", b"TOTAL 42.17"),
        ],
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let receipt = &body["receipt"];
    assert_eq!(receipt["company_context"], "xes");
    assert_eq!(receipt["uploader_note"], "Home Depot run");
    assert_eq!(receipt["related_quote_id"], Value::Null);
    assert_eq!(receipt["file_name"], "home_depot__1_.txt");
    assert_eq!(receipt["mime_type"], "text/plain");
    assert_eq!(receipt["file_size"], 11);

    let file_path = receipt["file_path"].as_str().unwrap();
    assert!(file_path.starts_with("xes/"));
    assert!(file_path.ends_with("_home_depot__1_.txt"));
    assert_eq!(
        std::fs::read(receipts_dir.join(file_path)).unwrap(),
        b"TOTAL 42.17"
    );

    let public_url = receipt["public_url"].as_str().unwrap();
    assert_eq!(public_url, format!("/files/{}", file_path));

    let request = Request::builder()
        .uri(public_url)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response.into_body()).await, b"TOTAL 42.17");

    let request = Request::builder()
        .uri("/api/receipts")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let list = extract_json(response.into_body()).await;
    assert_eq!(list["receipts"].as_array().unwrap().len(), 1);
    assert_eq!(list["receipts"][0]["id"], receipt["id"]);
}

#[tokio::test]
async fn test_upload_requires_company_and_file() {
    let (app, _, _dir) = setup_app().await;

    let cases = [
        (
            multipart_request(
                "/api/receipts",
                &[Part::File("r.txt", "text/plain", b"x")],
            ),
            "company_context is required",
        ),
        (
            multipart_request("/api/receipts", &[Part::Text("company_context", "gxs")]),
            "file is required",
        ),
    ];

    for (request, message) in cases {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"], message);
    }
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let (app, receipts_dir, _dir) = setup_app().await;

    let big = vec![b'a'; MAX_UPLOAD_BYTES + 1024];
    let request = multipart_request(
        "/api/receipts",
        &[
            Part::Text("company_context", "xes"),
            Part::File("big.bin", "application/octet-stream", &big),
        ],
    );
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(!receipts_dir.join("xes").exists());
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let (app, _, _dir) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/receipts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_failed_insert_removes_stored_file() {
    let (app, receipts_dir, pool, _dir) = setup_app_with_pool().await;

    sqlx::query("DROP TABLE receipts")
        .execute(&pool)
        .await
        .unwrap();

    let request = multipart_request(
        "/api/receipts",
        &[
            Part::Text("company_context", "gxs"),
            Part::File("lumber.txt", "text/plain", b"2x4 x 12"),
        ],
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
    assert_eq!(count_files(&receipts_dir), 0);
}
