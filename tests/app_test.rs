#![cfg(feature = "web")]

mod common;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use common::Fixture;
use ghg_dashboard::app::{AppState, router};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "ghg-form-boundary";

enum Part<'a> {
    File(&'a str, Vec<u8>),
    Text(&'a str, &'a str),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File(file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"files\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}", name, value).as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn post(uri: &str, parts: &[Part<'_>]) -> (StatusCode, Vec<u8>) {
    let app = router(Arc::new(AppState::new(None, 5)), Path::new("static"), 16 * 1024 * 1024);
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

#[tokio::test]
async fn dashboard_form_reads_repeated_filters_and_skips_empty_files() {
    let parts = [
        Part::File("huella_2024.xlsx", Fixture::standard(2024).to_bytes()),
        Part::File("", Vec::new()),
        Part::Text("scope", "Alcance 1"),
        Part::Text("scope", "Alcance 3"),
        Part::Text("category", "1.2 - Combustión móvil"),
        Part::Text("category", "3.07 - Traslado de colaboradores"),
        Part::Text("top_n", "2"),
    ];
    let (status, body) = post("/api/dashboard", &parts).await;
    assert_eq!(status, StatusCode::OK);

    let dashboard: Value = serde_json::from_slice(&body).unwrap();
    let sources: Vec<&str> = dashboard["detail"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["source"].as_str().unwrap())
        .collect();
    assert_eq!(sources, vec!["Diésel", "Bus", "Automóvil"]);

    let top: Vec<&str> = dashboard["top_sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["source"].as_str().unwrap())
        .collect();
    assert_eq!(top, vec!["Bus", "Diésel"]);

    // the empty part is not treated as a failed upload
    assert!(dashboard["failures"].as_array().unwrap().is_empty());
    assert!(dashboard["comparison"].is_null());
    println!("✓ Form filters applied: {:?}", sources);
}

#[tokio::test]
async fn non_numeric_top_n_is_a_bad_request() {
    let parts = [
        Part::File("huella_2024.xlsx", Fixture::standard(2024).to_bytes()),
        Part::Text("top_n", "cinco"),
    ];
    let (status, body) = post("/api/dashboard", &parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["status"], "error");
    assert!(error["message"].as_str().unwrap().contains("cinco"));
}

#[tokio::test]
async fn only_broken_uploads_is_unprocessable() {
    let parts = [
        Part::File("roto.xlsx", b"not a workbook".to_vec()),
        Part::File("", Vec::new()),
    ];
    let (status, body) = post("/api/dashboard", &parts).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let error: Value = serde_json::from_slice(&body).unwrap();
    let failures = error["failures"].as_array().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].as_str().unwrap().starts_with("error reading roto.xlsx"));
}

#[tokio::test]
async fn csv_export_is_an_attachment_of_filtered_rows() {
    let parts = [
        Part::File("huella_2024.xlsx", Fixture::standard(2024).to_bytes()),
        Part::Text("scope", "Alcance 2"),
    ];
    let (status, body) = post("/api/export/csv", &parts).await;
    assert_eq!(status, StatusCode::OK);

    let csv = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("Electricidad"));
}

#[tokio::test]
async fn unknown_chart_kind_is_rejected() {
    let parts = [Part::File("huella_2024.xlsx", Fixture::standard(2024).to_bytes())];
    let (status, _) = post("/api/chart/pie", &parts).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
