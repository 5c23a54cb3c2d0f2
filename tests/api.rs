//! End-to-end tests of the HTTP API, driven through the router without a socket.

use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tiny_http::Method;
use voc_insights::serve::read_body;
use voc_insights::upload::MAX_UPLOAD_BYTES;
use voc_insights::{route, AnalysisRequest, AppState, Database, FsObjectStore, Generator, Language, Reply};

const BOUNDARY: &str = "----voc-test-boundary";

fn state() -> (tempfile::TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_at(dir.path().join("reports.db")).unwrap();
    let store = Arc::new(FsObjectStore::new(dir.path().join("storage"), "reviews"));
    let state = AppState::new(db, store, Generator::new(), MAX_UPLOAD_BYTES);
    (dir, state)
}

fn multipart(file: Option<(&str, &str, &[u8])>, file_type: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(ft) = file_type {
        body.extend_from_slice(format!("--{}\r\nContent-Disposition: form-data; name=\"fileType\"\r\n\r\n{}\r\n", BOUNDARY, ft).as_bytes());
    }
    if let Some((name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(state: &AppState, name: &str, content_type: &str, data: &[u8], file_type: &str) -> Reply {
    let content = format!("multipart/form-data; boundary={}", BOUNDARY);
    route(state, &Method::Post, "/upload", Some(&content), &multipart(Some((name, content_type, data)), Some(file_type)))
}

fn analyze(state: &AppState, body: Value) -> Reply {
    route(state, &Method::Post, "/analyze", Some("application/json"), &serde_json::to_vec(&body).unwrap())
}

fn get(state: &AppState, url: &str) -> Reply {
    route(state, &Method::Get, url, None, &[])
}

fn body(reply: &Reply) -> Value {
    serde_json::from_slice(&reply.body).unwrap()
}

fn stored_upload(state: &AppState, file_type: &str) -> String {
    let reply = upload(state, "reviews export.csv", "text/csv", b"rating,text\n5,great\n1,broke\n", file_type);
    assert_eq!(reply.status, 200);
    body(&reply)["fileName"].as_str().unwrap().to_string()
}

// ============================================================================
// HEALTH + ROUTING
// ============================================================================

#[test]
fn test_health_reports_bucket_state() {
    let (_dir, state) = state();
    let reply = get(&state, "/health");
    assert_eq!(reply.status, 200);

    let value = body(&reply);
    assert_eq!(value["status"], "ok");
    assert_eq!(value["bucketInitialized"], true);
    assert!(value["timestamp"].is_string());
}

#[test]
fn test_unknown_route_is_404() {
    let (_dir, state) = state();
    let reply = get(&state, "/nope");
    assert_eq!(reply.status, 404);
    assert!(body(&reply)["error"].is_string());
}

// ============================================================================
// UPLOAD
// ============================================================================

#[test]
fn test_upload_stores_with_prefixed_name() {
    let (_dir, state) = state();
    let reply = upload(&state, "my reviews (1).csv", "text/csv", b"a,b\n", "competitor");
    assert_eq!(reply.status, 200);

    let value = body(&reply);
    assert_eq!(value["success"], true);
    assert_eq!(value["originalName"], "my reviews (1).csv");
    assert_eq!(value["fileType"], "competitor");
    assert_eq!(value["size"], 4);

    let name = value["fileName"].as_str().unwrap();
    assert!(name.starts_with("competitor-"));
    assert!(name.ends_with("-my_reviews__1_.csv"));
    assert_eq!(state.gate.store().get(name).unwrap(), b"a,b\n");
}

#[test]
fn test_same_name_uploads_never_overwrite() {
    let (_dir, state) = state();
    let names: Vec<String> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8)
            .map(|i| {
                let state = &state;
                scope.spawn(move || {
                    let data = format!("rating,text\n{},same name\n", i);
                    let reply = upload(state, "reviews.csv", "text/csv", data.as_bytes(), "ownBrand");
                    assert_eq!(reply.status, 200);
                    (body(&reply)["fileName"].as_str().unwrap().to_string(), data)
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| {
                let (name, data) = w.join().unwrap();
                assert_eq!(state.gate.store().get(&name).unwrap(), data.as_bytes());
                name
            })
            .collect()
    });

    let unique: std::collections::HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
}

#[test]
fn test_upload_size_ceiling() {
    let (_dir, state) = state();
    let exact = vec![b'x'; MAX_UPLOAD_BYTES];
    assert_eq!(upload(&state, "big.csv", "text/csv", &exact, "ownBrand").status, 200);

    let over = vec![b'x'; MAX_UPLOAD_BYTES + 1];
    let reply = upload(&state, "big.csv", "text/csv", &over, "ownBrand");
    assert_eq!(reply.status, 400);
    assert!(body(&reply)["error"].as_str().unwrap().contains("too large"));
}

#[test]
fn test_upload_far_over_body_cap_is_size_error() {
    let over = vec![b'x'; 11 * 1024 * 1024];
    let form = multipart(Some(("huge.csv", "text/csv", &over)), Some("ownBrand"));

    for declared in [Some(form.len()), None] {
        let err = read_body(std::io::Cursor::new(&form), declared, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.status(), 400);
        let message = err.body().error;
        assert!(message.contains("too large"), "{}", message);
        assert!(!message.contains("Malformed"), "{}", message);
    }
}

#[test]
fn test_upload_rejects_txt_even_with_csv_mime() {
    let (_dir, state) = state();
    assert_eq!(upload(&state, "notes.txt", "text/csv", b"a", "ownBrand").status, 400);
    assert_eq!(upload(&state, "notes.txt", "text/plain", b"a", "ownBrand").status, 400);
}

#[test]
fn test_upload_requires_file_and_valid_type() {
    let (_dir, state) = state();
    let content = format!("multipart/form-data; boundary={}", BOUNDARY);

    let no_file = route(&state, &Method::Post, "/upload", Some(&content), &multipart(None, Some("ownBrand")));
    assert_eq!(no_file.status, 400);

    let no_type = route(&state, &Method::Post, "/upload", Some(&content), &multipart(Some(("a.csv", "text/csv", b"x")), None));
    assert_eq!(no_type.status, 400);

    assert_eq!(upload(&state, "a.csv", "text/csv", b"x", "rival").status, 400);

    let not_multipart = route(&state, &Method::Post, "/upload", Some("application/json"), b"{}");
    assert_eq!(not_multipart.status, 400);
}

#[test]
fn test_upload_when_storage_unavailable_is_503() {
    let dir = tempfile::tempdir().unwrap();
    // A plain file where the storage root should be: the bucket can never be created
    let blocked = dir.path().join("storage");
    std::fs::write(&blocked, b"not a directory").unwrap();

    let db = Database::open_at(dir.path().join("reports.db")).unwrap();
    let state = AppState::new(db, Arc::new(FsObjectStore::new(&blocked, "reviews")), Generator::new(), MAX_UPLOAD_BYTES);

    assert_eq!(body(&get(&state, "/health"))["bucketInitialized"], false);
    assert_eq!(upload(&state, "a.csv", "text/csv", b"x", "ownBrand").status, 503);
}

// ============================================================================
// ANALYZE
// ============================================================================

#[test]
fn test_analyze_chinese_without_competitor() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");

    let reply = analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Smart Watch", "language": "zh"}));
    assert_eq!(reply.status, 200);

    let value = body(&reply);
    assert!(value.get("competitiveAnalysis").is_none());
    assert_eq!(value["hasCompetitorData"], false);
    assert_eq!(value["language"], "zh");
    assert_eq!(value["targetCategory"], "Smart Watch");
    assert_eq!(value["persona"]["personas"][0]["name"], "Smart Watch日常重度用户");
    assert_eq!(value["opportunities"]["table"]["rows"][0]["title"], "提升Smart Watch耐用性");

    let raw = String::from_utf8(reply.body.clone()).unwrap();
    assert!(!raw.contains("{category}"));
}

#[test]
fn test_analyze_with_competitor() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");
    let competitor = stored_upload(&state, "competitor");

    let reply = analyze(&state, json!({"ownBrandFile": own, "competitorFile": competitor, "targetCategory": "Kettle"}));
    assert_eq!(reply.status, 200);

    let value = body(&reply);
    assert_eq!(value["hasCompetitorData"], true);
    assert_eq!(value["language"], "en");
    assert!(value["competitiveAnalysis"]["comparison"]["rows"].as_array().unwrap().len() > 0);
}

#[test]
fn test_analyze_validation() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");

    assert_eq!(analyze(&state, json!({"ownBrandFile": own})).status, 400);
    assert_eq!(analyze(&state, json!({"targetCategory": "Kettle"})).status, 400);
    assert_eq!(analyze(&state, json!({"ownBrandFile": own, "targetCategory": "   "})).status, 400);
    assert_eq!(analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Kettle", "language": "fr"})).status, 400);

    let garbage = route(&state, &Method::Post, "/analyze", Some("application/json"), b"{not json");
    assert_eq!(garbage.status, 400);

    // Nothing was persisted by the rejected requests
    assert_eq!(body(&get(&state, "/reports")).as_array().unwrap().len(), 0);
}

#[test]
fn test_analyze_missing_upload_surfaces_storage_error() {
    let (_dir, state) = state();
    let reply = analyze(&state, json!({"ownBrandFile": "ownBrand-1-ghost.csv", "targetCategory": "Kettle"}));
    assert_eq!(reply.status, 500);
    assert!(body(&reply)["error"].as_str().unwrap().contains("ownBrand-1-ghost.csv"));
}

// ============================================================================
// REPORT RETRIEVAL
// ============================================================================

#[test]
fn test_reports_listed_newest_first() {
    let (_dir, state) = state();
    let generate = |id: &str, secs: i64| {
        let request = AnalysisRequest {
            own_brand_file: "ownBrand-1-a.csv".to_string(),
            competitor_file: None,
            target_category: "Kettle".to_string(),
            language: Language::En,
        };
        Generator::new()
            .generate_at(&request, id.to_string(), Utc.timestamp_opt(1_760_000_000 + secs, 0).unwrap())
            .unwrap()
    };

    // Stored out of chronological order
    state.db.insert_report(&generate("second", 60)).unwrap();
    state.db.insert_report(&generate("first", 0)).unwrap();

    let reply = get(&state, "/reports");
    assert_eq!(reply.status, 200);
    let list = body(&reply);
    let ids: Vec<&str> = list.as_array().unwrap().iter().map(|r| r["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["second", "first"]);
    assert!(list[0]["title"].as_str().unwrap().starts_with("Analysis Report - "));
    assert_eq!(list[0]["hasCompetitorData"], false);
}

#[test]
fn test_analyzed_reports_listed_newest_first() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");

    let first = body(&analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Kettle"})));
    std::thread::sleep(std::time::Duration::from_millis(5));
    let second = body(&analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Toaster", "language": "zh"})));

    let list = body(&get(&state, "/reports"));
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[1]["id"], first["id"]);
    assert!(list[0]["title"].as_str().unwrap().starts_with("分析报告 - "));
}

#[test]
fn test_get_report_by_id() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");
    let created = body(&analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Kettle"})));
    let id = created["id"].as_str().unwrap();

    let reply = get(&state, &format!("/report/{}", id));
    assert_eq!(reply.status, 200);
    assert_eq!(body(&reply), created);

    let missing = get(&state, "/report/does-not-exist");
    assert_eq!(missing.status, 404);
    assert!(body(&missing)["error"].as_str().unwrap().contains("does-not-exist"));
}

// ============================================================================
// HTML PAGES
// ============================================================================

#[test]
fn test_dashboard_and_index_pages() {
    let (_dir, state) = state();
    let own = stored_upload(&state, "ownBrand");
    let created = body(&analyze(&state, json!({"ownBrandFile": own, "targetCategory": "Kettle"})));
    let id = created["id"].as_str().unwrap();

    let index = get(&state, "/");
    assert_eq!(index.status, 200);
    assert!(index.content_type.starts_with("text/html"));
    assert!(String::from_utf8(index.body).unwrap().contains(&format!("/dashboard?id={}", id)));

    let page = get(&state, &format!("/dashboard?id={}", id));
    assert_eq!(page.status, 200);
    assert!(String::from_utf8(page.body).unwrap().contains("id=\"rating-chart\""));

    assert_eq!(get(&state, "/dashboard").status, 400);
    assert_eq!(get(&state, "/dashboard?id=missing").status, 404);
}
