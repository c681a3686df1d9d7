//! Router tests against the in-memory store.
//!
//! Exercises routing, auth, status mapping and the CSV response headers
//! without a database.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use dai_api::{router, services::StreamWrapperUrlResolver, AppState};
use dai_core::{
    ApiKey, ArchiveFlags, ArchiveReason, ArchiveRecord, ArchiveService, ArchiveStatus, AssetType,
    InMemoryStore,
};

const MANAGER_KEY: &str = "dai_key_manager";
const VIEWER_KEY: &str = "dai_key_viewer";

fn record(id: u128, status: ArchiveStatus, asset_type: AssetType) -> ArchiveRecord {
    ArchiveRecord {
        id: Uuid::from_u128(id),
        file_name: format!("record-{}.pdf", id),
        status,
        asset_type,
        flags: ArchiveFlags::default(),
        is_private: false,
        archive_reason: ArchiveReason::Reference,
        archive_reason_other: None,
        public_description: None,
        created_at: Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap(),
        archive_classification_date: Some(
            Utc.with_ymd_and_hms(2025, 1, id as u32, 0, 0, 0).unwrap(),
        ),
        deleted_date: None,
        archived_by: None,
        deleted_by: None,
        filesize: Some(2048),
        file_checksum: Some("abc123".to_string()),
        usage_count_at_archive: 0,
        original_path: format!("public://record-{}.pdf", id),
        archive_path: None,
    }
}

fn key(scope: &str) -> ApiKey {
    ApiKey {
        id: Uuid::now_v7(),
        user_id: Some(Uuid::from_u128(500)),
        name: scope.to_string(),
        scope: scope.to_string(),
        created_at: Utc::now(),
        revoked: false,
    }
}

async fn app() -> Router {
    let store = Arc::new(InMemoryStore::new());
    store
        .put_record(record(1, ArchiveStatus::ArchivedPublic, AssetType::Pdf))
        .await;
    store
        .put_record(record(2, ArchiveStatus::ArchivedAdmin, AssetType::Word))
        .await;
    store
        .put_record(record(3, ArchiveStatus::ArchivedDeleted, AssetType::Pdf))
        .await;
    store
        .put_record(record(4, ArchiveStatus::ExemptionVoid, AssetType::Page))
        .await;
    store.put_user(Uuid::from_u128(500), "Records Manager").await;
    store.put_api_key(MANAGER_KEY, key("archive:manage")).await;
    store.put_api_key(VIEWER_KEY, key("archive:view")).await;

    let files = Arc::new(StreamWrapperUrlResolver::new(
        "https://town.example.gov",
        "/sites/default/files",
        "/system/files",
    ));
    let service = ArchiveService::new(store.clone(), store.clone(), store.clone(), files);
    router(AppState::new(service, store), &[])
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn post_note(id: u128, text: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(format!("/archive-registry/{}/notes", Uuid::from_u128(id)))
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(serde_json::json!({ "text": text }).to_string()))
        .unwrap()
}

fn json(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = send(app().await, get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["status"], "healthy");
}

#[tokio::test]
async fn test_registry_lists_only_visible_records() {
    let (status, _, body) = send(app().await, get("/archive-registry", None)).await;
    assert_eq!(status, StatusCode::OK);
    let entries = json(&body);
    let ids: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![
            Uuid::from_u128(2).to_string(),
            Uuid::from_u128(1).to_string()
        ]
    );
}

#[tokio::test]
async fn test_public_detail_has_download_link() {
    let uri = format!("/archive-registry/{}", Uuid::from_u128(1));
    let (status, _, body) = send(app().await, get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    let detail = json(&body);
    assert_eq!(detail["disclosure"], "full");
    assert_eq!(
        detail["file_url"],
        "https://town.example.gov/sites/default/files/record-1.pdf"
    );
    assert_eq!(detail["source_link"]["label"], "Download");
}

#[tokio::test]
async fn test_admin_detail_limited_for_anonymous() {
    let uri = format!("/archive-registry/{}", Uuid::from_u128(2));
    let (status, _, body) = send(app().await, get(&uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    let detail = json(&body);
    assert_eq!(detail["disclosure"], "limited");
    assert!(detail.get("file_url").is_none());
    assert!(detail.get("source_link").is_none());

    let (_, _, body) = send(app().await, get(&uri, Some(VIEWER_KEY))).await;
    assert_eq!(json(&body)["disclosure"], "full");
}

#[tokio::test]
async fn test_deleted_detail_is_not_found_even_for_managers() {
    let uri = format!("/archive-registry/{}", Uuid::from_u128(3));
    let (status, _, body) = send(app().await, get(&uri, Some(MANAGER_KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(json(&body)["error"].as_str().is_some());
}

#[tokio::test]
async fn test_notes_page_denied_vs_not_found() {
    let admin_notes = format!("/archive-registry/{}/notes", Uuid::from_u128(2));
    let (status, _, _) = send(app().await, get(&admin_notes, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let void_notes = format!("/archive-registry/{}/notes", Uuid::from_u128(4));
    let (status, _, _) = send(app().await, get(&void_notes, Some(MANAGER_KEY))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_note_then_page() {
    let app = app().await;
    let (status, _, _) = send(
        app.clone(),
        post_note(1, "  Verified against council minutes  ", Some(MANAGER_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/archive-registry/{}/notes?page=0&limit=10", Uuid::from_u128(1));
    let (status, _, body) = send(app, get(&uri, Some(VIEWER_KEY))).await;
    assert_eq!(status, StatusCode::OK);
    let page = json(&body);
    assert_eq!(page["notes"][0]["text"], "Verified against council minutes");
    assert_eq!(page["notes"][0]["author_name"], "Records Manager");
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["has_more"], false);
    assert_eq!(page["can_add_note"], false);
    assert_eq!(page["archive"]["archived_by"], "Unknown");
}

#[tokio::test]
async fn test_add_note_validation_and_permission() {
    let (status, _, _) = send(app().await, post_note(1, "   ", Some(MANAGER_KEY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(501);
    let (status, _, _) = send(app().await, post_note(1, &long, Some(MANAGER_KEY))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(app().await, post_note(1, "hello", Some(VIEWER_KEY))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_audit_export_requires_manage() {
    let (status, _, _) = send(app().await, get("/admin/archive-audit/export", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _, _) = send(
        app().await,
        get("/admin/archive-audit/export", Some(VIEWER_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_audit_export_headers_and_rows() {
    let (status, headers, body) = send(
        app().await,
        get("/admin/archive-audit/export", Some(MANAGER_KEY)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "text/csv; charset=utf-8");
    assert_eq!(
        headers[header::CACHE_CONTROL],
        "no-cache, no-store, must-revalidate"
    );
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"archive-audit-export-"));
    assert!(disposition.ends_with(".csv\""));

    let body = String::from_utf8(body).unwrap();
    assert!(!body.contains('\r'));
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Archive ID,File Name,Asset Type,Archive Type"));
    // deleted and voided records are only reachable here
    assert!(body.contains(&Uuid::from_u128(3).to_string()));
    assert!(body.contains(&Uuid::from_u128(4).to_string()));
}

#[tokio::test]
async fn test_unknown_key_is_anonymous() {
    let uri = format!("/archive-registry/{}", Uuid::from_u128(2));
    let (status, _, body) = send(app().await, get(&uri, Some("dai_key_nope"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["disclosure"], "limited");
}

#[tokio::test]
async fn test_openapi_document() {
    let (status, _, body) = send(app().await, get("/openapi.json", None)).await;
    assert_eq!(status, StatusCode::OK);
    let doc = json(&body);
    assert!(doc["paths"]["/archive-registry/{id}/notes"].is_object());
}
