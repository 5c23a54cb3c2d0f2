//! HTTP server
//!
//! `voc-insights serve` → opens the report store and upload bucket, starts
//! the worker threads and opens the browser on the report index.
//!
//! Request handling is split in two: [`route`] is a pure function from
//! (method, url, content type, body) to a [`Reply`], and the tiny_http loop
//! only moves bytes in and out. Every handler error is converted to a JSON
//! `{"error": ...}` reply at the boundary; nothing is half-written.

use crate::config::ServerConfig;
use crate::db::{Database, DbError};
use crate::error::ApiError;
use crate::generator::{AnalysisRequest, Generator, UploadDigest};
use crate::model::{AnalysisReport, Language};
use crate::report;
use crate::storage::{BucketGate, FsObjectStore, ObjectStore};
use crate::upload::{self, FileType, UploadError, UploadReceipt, UploadedFile};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::thread;
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{debug, error, info, warn};

/// Slack on top of the file limit for multipart framing and text fields
const FORM_OVERHEAD_BYTES: usize = 64 * 1024;

/// Everything a request handler needs
pub struct AppState {
    pub db: Database,
    pub gate: BucketGate,
    pub generator: Generator,
    pub max_upload_bytes: usize,
    last_upload_millis: AtomicI64,
}

impl AppState {
    pub fn new(db: Database, store: Arc<dyn ObjectStore>, generator: Generator, max_upload_bytes: usize) -> Self {
        let gate = BucketGate::new(store);
        if let Err(e) = gate.initialize() {
            // Handlers retry once per request
            warn!(error = %e, "storage bucket not initialized at startup");
        }
        Self { db, gate, generator, max_upload_bytes, last_upload_millis: AtomicI64::new(0) }
    }

    pub fn open(config: &ServerConfig) -> Result<Self, DbError> {
        let db = Database::open_at(&config.db_path)?;
        let store = Arc::new(FsObjectStore::new(&config.storage_root, &config.bucket));
        Ok(Self::new(db, store, Generator::new(), config.max_upload_bytes))
    }

    /// Upload timestamp, strictly increasing across calls so two uploads
    /// with the same original name never share a stored name.
    fn next_upload_millis(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let prev = self
            .last_upload_millis
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or(now);
        now.max(prev + 1)
    }

    /// Validate an uploaded review file and put it in the bucket
    pub fn store_upload(&self, file: UploadedFile, file_type: FileType) -> Result<UploadReceipt, ApiError> {
        file.validate(self.max_upload_bytes)?;
        self.gate.ensure_ready()?;

        let file_name = upload::stored_name(file_type, self.next_upload_millis(), &file.original_name);
        self.gate.store().put(&file_name, &file.data, &file.content_type)?;
        info!(file = %file_name, size = file.data.len(), file_type = %file_type, "stored upload");

        Ok(UploadReceipt {
            success: true,
            file_name,
            original_name: file.original_name,
            size: file.data.len(),
            file_type,
        })
    }

    /// Generate, read back the referenced uploads, and persist the report
    pub fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReport, ApiError> {
        // Field validation happens here, before any download
        let report = self.generator.generate(request)?;

        self.gate.ensure_ready()?;
        let files = std::iter::once(&request.own_brand_file).chain(request.competitor_file.as_ref());
        for name in files {
            let data = self.gate.store().get(name)?;
            let digest = UploadDigest::from_bytes(&data);
            debug!(file = %name, bytes = digest.bytes, rows = digest.lines, "read review file");
        }

        self.db.insert_report(&report)?;
        info!(id = %report.id, category = %report.target_category, language = %report.language, "generated report");
        Ok(report)
    }
}

/// A complete response, built before anything is sent
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl Reply {
    fn json<T: Serialize>(status: u16, value: &T) -> Result<Self, ApiError> {
        Ok(Self { status, content_type: "application/json", body: serde_json::to_vec(value)? })
    }

    fn html(body: Vec<u8>) -> Self {
        Self { status: 200, content_type: "text/html; charset=utf-8", body }
    }

    fn error(err: &ApiError) -> Self {
        let body = serde_json::to_vec(&err.body()).unwrap_or_else(|_| br#"{"error":"internal error"}"#.to_vec());
        Self { status: err.status(), content_type: "application/json", body }
    }

    fn empty(status: u16) -> Self {
        Self { status, content_type: "text/plain", body: Vec::new() }
    }
}

// ============================================================================
// Request bodies
// ============================================================================

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBody {
    #[serde(default)]
    own_brand_file: Option<String>,
    #[serde(default)]
    competitor_file: Option<String>,
    #[serde(default)]
    target_category: Option<String>,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct PageQuery {
    id: Option<String>,
    lang: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Health {
    status: &'static str,
    bucket_initialized: bool,
    timestamp: chrono::DateTime<Utc>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn parse_language(value: Option<String>) -> Result<Language, ApiError> {
    match non_empty(value) {
        Some(s) => Ok(s.parse()?),
        None => Ok(Language::default()),
    }
}

fn query(url: &str) -> PageQuery {
    url.split_once('?')
        .and_then(|(_, q)| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default()
}

// ============================================================================
// Router
// ============================================================================

/// Dispatch one request. Never fails: errors become JSON error replies.
pub fn route(state: &AppState, method: &Method, url: &str, content_type: Option<&str>, body: &[u8]) -> Reply {
    let path = url.split('?').next().unwrap_or("/");

    let result = match (method, path) {
        (&Method::Options, _) => Ok(Reply::empty(204)),
        (&Method::Post, "/upload") => handle_upload(state, content_type, body),
        (&Method::Post, "/analyze") => handle_analyze(state, body),
        (&Method::Get, "/reports") => handle_reports(state),
        (&Method::Get, "/health") => handle_health(state),
        (&Method::Get, "/") => handle_index(state, url),
        (&Method::Get, "/dashboard") => handle_dashboard(state, url),
        (&Method::Get, p) if p.starts_with("/report/") => handle_report(state, &p["/report/".len()..]),
        _ => Err(ApiError::NotFound("Not found".to_string())),
    };

    match result {
        Ok(reply) => {
            info!(method = %method, path, status = reply.status, "served");
            reply
        }
        Err(e) => failure(method, path, &e),
    }
}

fn failure(method: &Method, path: &str, e: &ApiError) -> Reply {
    if e.status() >= 500 {
        error!(method = %method, path, error = %e, "request failed");
    } else {
        warn!(method = %method, path, status = e.status(), error = %e, "request rejected");
    }
    Reply::error(e)
}

/// Read a request body for a server accepting files up to `max_upload_bytes`.
/// A declared length or an actual body past the cap is a size error; the
/// body is never handed on truncated.
pub fn read_body<R: Read>(reader: R, declared: Option<usize>, max_upload_bytes: usize) -> Result<Vec<u8>, ApiError> {
    let cap = max_upload_bytes + FORM_OVERHEAD_BYTES;
    if let Some(size) = declared.filter(|&n| n > cap) {
        return Err(UploadError::TooLarge { size, limit: max_upload_bytes }.into());
    }

    let mut body = Vec::new();
    reader
        .take(cap as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ApiError::Validation(format!("Failed to read request body: {}", e)))?;
    if body.len() > cap {
        return Err(UploadError::TooLarge { size: body.len(), limit: max_upload_bytes }.into());
    }
    Ok(body)
}

fn handle_upload(state: &AppState, content_type: Option<&str>, body: &[u8]) -> Result<Reply, ApiError> {
    let boundary = content_type
        .and_then(upload::boundary_from_content_type)
        .ok_or_else(|| UploadError::Malformed("expected a multipart/form-data body".to_string()))?;
    let mut form = upload::parse_multipart(body, &boundary)?;

    let file = form.take_file("file").ok_or(UploadError::MissingFile)?;
    let file_type: FileType = form.field("fileType").ok_or(UploadError::MissingFileType)?.parse()?;
    Reply::json(200, &state.store_upload(file, file_type)?)
}

fn handle_analyze(state: &AppState, body: &[u8]) -> Result<Reply, ApiError> {
    let params: AnalyzeBody = if body.iter().all(u8::is_ascii_whitespace) {
        AnalyzeBody::default()
    } else {
        serde_json::from_slice(body).map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))?
    };

    let request = AnalysisRequest {
        own_brand_file: non_empty(params.own_brand_file).unwrap_or_default(),
        competitor_file: non_empty(params.competitor_file),
        target_category: params.target_category.unwrap_or_default(),
        language: parse_language(params.language)?,
    };
    Reply::json(200, &state.analyze(&request)?)
}

fn handle_reports(state: &AppState) -> Result<Reply, ApiError> {
    Reply::json(200, &state.db.list_reports()?)
}

fn handle_report(state: &AppState, id: &str) -> Result<Reply, ApiError> {
    match state.db.get_report(id)? {
        Some(report) => Reply::json(200, &report),
        None => Err(ApiError::NotFound(format!("Report '{}' not found", id))),
    }
}

fn handle_health(state: &AppState) -> Result<Reply, ApiError> {
    Reply::json(
        200,
        &Health { status: "ok", bucket_initialized: state.gate.is_ready(), timestamp: Utc::now() },
    )
}

fn handle_index(state: &AppState, url: &str) -> Result<Reply, ApiError> {
    let language = parse_language(query(url).lang)?;
    let mut out = Vec::new();
    report::html::write_index(&mut out, &state.db.list_reports()?, language)?;
    Ok(Reply::html(out))
}

fn handle_dashboard(state: &AppState, url: &str) -> Result<Reply, ApiError> {
    let id = non_empty(query(url).id).ok_or_else(|| ApiError::Validation("id is required".to_string()))?;
    let report = state
        .db
        .get_report(&id)?
        .ok_or_else(|| ApiError::NotFound(format!("Report '{}' not found", id)))?;
    let mut out = Vec::new();
    report::html::write(&mut out, &report)?;
    Ok(Reply::html(out))
}

// ============================================================================
// tiny_http plumbing
// ============================================================================

/// Start the server, optionally open the browser, and serve until killed
pub fn start(config: ServerConfig, open_browser: bool) -> std::io::Result<()> {
    let state = Arc::new(AppState::open(&config).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?);
    let server = Arc::new(
        Server::http(config.addr()).map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?,
    );

    let url = config.url();
    eprintln!("\n\x1b[1;32mVOC Insights\x1b[0m");
    eprintln!("   {}", url);
    eprintln!("   Reports: {}\n", config.db_path.display());
    info!(addr = %config.addr(), workers = config.workers, "listening");

    if open_browser {
        let _ = open::that(&url);
    }

    let workers: Vec<_> = (0..config.workers.max(1))
        .map(|_| {
            let server = Arc::clone(&server);
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for request in server.incoming_requests() {
                    if let Err(e) = handle_request(request, &state) {
                        error!(error = %e, "failed to send response");
                    }
                }
            })
        })
        .collect();

    for worker in workers {
        let _ = worker.join();
    }
    Ok(())
}

fn handle_request(mut request: Request, state: &AppState) -> std::io::Result<()> {
    let url = request.url().to_string();
    let method = request.method().clone();
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let declared = request.body_length();
    let reply = match read_body(request.as_reader(), declared, state.max_upload_bytes) {
        Ok(body) => route(state, &method, &url, content_type.as_deref(), &body),
        Err(e) => failure(&method, url.split('?').next().unwrap_or("/"), &e),
    };

    let mut response = Response::from_data(reply.body).with_status_code(reply.status);
    let headers = [
        ("Content-Type", reply.content_type),
        ("Access-Control-Allow-Origin", "*"),
        ("Access-Control-Allow-Headers", "Content-Type"),
    ];
    for (field, value) in headers {
        if let Ok(header) = Header::from_bytes(field.as_bytes(), value.as_bytes()) {
            response.add_header(header);
        }
    }
    request.respond(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::MAX_UPLOAD_BYTES;
    use std::io::Cursor;

    // ==========================================================================
    // BODY CAP
    // ==========================================================================

    #[test]
    fn test_body_within_cap_is_read_whole() {
        let data = vec![b'x'; MAX_UPLOAD_BYTES + 100];
        let body = read_body(Cursor::new(&data), Some(data.len()), MAX_UPLOAD_BYTES).unwrap();
        assert_eq!(body.len(), data.len());
    }

    #[test]
    fn test_declared_length_over_cap_is_size_error() {
        let size = 11 * 1024 * 1024;
        let err = read_body(Cursor::new(Vec::new()), Some(size), MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("File too large"), "{}", err);
    }

    #[test]
    fn test_undeclared_body_over_cap_is_size_error() {
        // Chunked bodies carry no length, so the read itself must notice
        let data = vec![b'x'; 11 * 1024 * 1024];
        let err = read_body(Cursor::new(&data), None, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err.status(), 400);
        assert!(err.to_string().contains("File too large"), "{}", err);
        assert!(!err.to_string().contains("Malformed"));
    }

    #[test]
    fn test_body_exactly_at_cap_is_accepted() {
        let cap = MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES;
        let data = vec![b'x'; cap];
        assert_eq!(read_body(Cursor::new(&data), None, MAX_UPLOAD_BYTES).unwrap().len(), cap);
    }
}
