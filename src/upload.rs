//! Upload validation and multipart decoding
//!
//! Only CSV and Excel review exports are accepted, capped at 10 MiB.
//! Stored objects are named `{fileType}-{unixMillis}-{sanitizedName}`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upload size ceiling (inclusive)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: [&str; 3] = [
    "text/csv",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["csv", "xls", "xlsx"];

/// Browsers send this for files they can't classify; the extension decides
const GENERIC_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("fileType is required")]
    MissingFileType,

    #[error("Invalid fileType '{0}' (expected 'ownBrand' or 'competitor')")]
    InvalidFileType(String),

    #[error("Invalid file type for '{name}': only CSV and Excel files are allowed")]
    UnsupportedFormat { name: String, content_type: String },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Malformed multipart body: {0}")]
    Malformed(String),
}

/// Which side of the comparison an upload belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileType {
    OwnBrand,
    Competitor,
}

impl FileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::OwnBrand => "ownBrand",
            FileType::Competitor => "competitor",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = UploadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(UploadError::MissingFileType),
            "ownBrand" => Ok(FileType::OwnBrand),
            "competitor" => Ok(FileType::Competitor),
            other => Err(UploadError::InvalidFileType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn validate(&self, limit: usize) -> Result<(), UploadError> {
        validate(&self.original_name, &self.content_type, self.data.len(), limit)
    }
}

/// Response body of `POST /upload`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub success: bool,
    pub file_name: String,
    pub original_name: String,
    pub file_type: FileType,
    pub size: usize,
}

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
}

fn essence(content_type: &str) -> String {
    content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase()
}

/// Check format and size. The extension must always be CSV/Excel, so a
/// `.txt` is rejected whatever MIME type the client declared.
pub fn validate(name: &str, content_type: &str, size: usize, limit: usize) -> Result<(), UploadError> {
    let ext_ok = extension(name)
        .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    let mime = essence(content_type);
    let mime_ok = mime.is_empty() || mime == GENERIC_MIME || ACCEPTED_MIME_TYPES.contains(&mime.as_str());

    if !ext_ok || !mime_ok {
        return Err(UploadError::UnsupportedFormat {
            name: name.to_string(),
            content_type: content_type.to_string(),
        });
    }
    if size > limit {
        return Err(UploadError::TooLarge { size, limit });
    }
    Ok(())
}

/// MIME type for a local file, from its extension. Unknown extensions get
/// the generic type and are then rejected by [`validate`].
pub fn content_type_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("csv") => ACCEPTED_MIME_TYPES[0],
        Some("xls") => ACCEPTED_MIME_TYPES[1],
        Some("xlsx") => ACCEPTED_MIME_TYPES[2],
        _ => GENERIC_MIME,
    }
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect()
}

pub fn stored_name(file_type: FileType, unix_millis: i64, original_name: &str) -> String {
    format!("{}-{}-{}", file_type, unix_millis, sanitize_file_name(original_name))
}

// ============================================================================
// multipart/form-data
// ============================================================================

/// Decoded form: plain text fields plus file parts
#[derive(Debug, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, UploadedFile)>,
}

impl MultipartForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let pos = self.files.iter().position(|(n, _)| n == name)?;
        Some(self.files.swap_remove(pos).1)
    }
}

/// Extract the boundary parameter from a `multipart/form-data` content type
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mut parts = content_type.split(';');
    if essence(parts.next()?) != "multipart/form-data" {
        return None;
    }
    parts
        .filter_map(|p| p.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| i + from)
}

fn header_param(header: &str, key: &str) -> Option<String> {
    header
        .split(';')
        .skip(1)
        .filter_map(|p| p.trim().split_once('='))
        .find(|(k, _)| k.trim().eq_ignore_ascii_case(key))
        .map(|(_, v)| v.trim().trim_matches('"').to_string())
}

pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<MultipartForm, UploadError> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let next_delimiter = format!("\r\n--{}", boundary).into_bytes();
    let malformed = |msg: &str| UploadError::Malformed(msg.to_string());

    let mut pos = find(body, &delimiter, 0).ok_or_else(|| malformed("opening boundary not found"))?;
    let mut form = MultipartForm::default();

    loop {
        pos += delimiter.len();
        if body[pos..].starts_with(b"--") {
            return Ok(form);
        }
        if !body[pos..].starts_with(b"\r\n") {
            return Err(malformed("boundary not followed by CRLF"));
        }
        pos += 2;

        let header_end = find(body, b"\r\n\r\n", pos).ok_or_else(|| malformed("part headers not terminated"))?;
        let headers = String::from_utf8_lossy(&body[pos..header_end]).to_string();
        let content_start = header_end + 4;
        let content_end = find(body, &next_delimiter, content_start)
            .ok_or_else(|| malformed("closing boundary not found"))?;
        let content = &body[content_start..content_end];

        let mut disposition = None;
        let mut part_type = String::new();
        for line in headers.split("\r\n") {
            if let Some((name, value)) = line.split_once(':') {
                if name.trim().eq_ignore_ascii_case("content-disposition") {
                    disposition = Some(value.trim().to_string());
                } else if name.trim().eq_ignore_ascii_case("content-type") {
                    part_type = value.trim().to_string();
                }
            }
        }

        let disposition = disposition.ok_or_else(|| malformed("part without Content-Disposition"))?;
        let name = header_param(&disposition, "name").ok_or_else(|| malformed("part without a name"))?;

        match header_param(&disposition, "filename") {
            Some(filename) => form.files.push((
                name,
                UploadedFile { original_name: filename, content_type: part_type, data: content.to_vec() },
            )),
            None => form.fields.push((name, String::from_utf8_lossy(content).to_string())),
        }

        // Point at the next delimiter, past the CRLF that precedes it
        pos = content_end + 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

    #[test]
    fn test_content_type_for_local_files() {
        assert_eq!(content_type_for("a.CSV"), "text/csv");
        assert_eq!(content_type_for("b.xlsx"), XLSX);
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert!(validate("notes.txt", content_type_for("notes.txt"), 1, MAX_UPLOAD_BYTES).is_err());
    }

    // ==========================================================================
    // SIZE LIMIT
    // ==========================================================================

    #[test]
    fn test_exactly_ten_megabytes_accepted() {
        assert!(validate("reviews.csv", "text/csv", MAX_UPLOAD_BYTES, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_one_byte_over_rejected() {
        let err = validate("reviews.csv", "text/csv", MAX_UPLOAD_BYTES + 1, MAX_UPLOAD_BYTES).unwrap_err();
        assert_eq!(err, UploadError::TooLarge { size: MAX_UPLOAD_BYTES + 1, limit: MAX_UPLOAD_BYTES });
    }

    // ==========================================================================
    // FORMAT
    // ==========================================================================

    #[test]
    fn test_txt_rejected_regardless_of_mime() {
        for mime in ["text/plain", "text/csv", XLSX, GENERIC_MIME] {
            let err = validate("notes.txt", mime, 10, MAX_UPLOAD_BYTES).unwrap_err();
            assert!(matches!(err, UploadError::UnsupportedFormat { .. }), "{}", mime);
        }
    }

    #[test]
    fn test_spreadsheet_types_accepted() {
        assert!(validate("a.csv", "text/csv; charset=utf-8", 1, MAX_UPLOAD_BYTES).is_ok());
        assert!(validate("a.XLS", "application/vnd.ms-excel", 1, MAX_UPLOAD_BYTES).is_ok());
        assert!(validate("a.xlsx", XLSX, 1, MAX_UPLOAD_BYTES).is_ok());
        assert!(validate("a.csv", GENERIC_MIME, 1, MAX_UPLOAD_BYTES).is_ok());
    }

    #[test]
    fn test_wrong_mime_with_valid_extension_rejected() {
        assert!(validate("a.csv", "image/png", 1, MAX_UPLOAD_BYTES).is_err());
        assert!(validate("noextension", "text/csv", 1, MAX_UPLOAD_BYTES).is_err());
    }

    #[test]
    fn test_file_type_parse() {
        assert_eq!("ownBrand".parse::<FileType>(), Ok(FileType::OwnBrand));
        assert_eq!("competitor".parse::<FileType>(), Ok(FileType::Competitor));
        assert_eq!("".parse::<FileType>(), Err(UploadError::MissingFileType));
        assert_eq!("other".parse::<FileType>(), Err(UploadError::InvalidFileType("other".to_string())));
    }

    // ==========================================================================
    // NAMING
    // ==========================================================================

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("my report (final).csv"), "my_report__final_.csv");
        assert_eq!(sanitize_file_name("Q3-2026.xlsx"), "Q3-2026.xlsx");
        assert_eq!(sanitize_file_name("评论.csv"), "__.csv");
    }

    #[test]
    fn test_stored_name_format() {
        assert_eq!(
            stored_name(FileType::Competitor, 1_760_000_000_000, "rival data.csv"),
            "competitor-1760000000000-rival_data.csv"
        );
    }

    // ==========================================================================
    // MULTIPART
    // ==========================================================================

    fn form_body(boundary: &str) -> Vec<u8> {
        format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"fileType\"\r\n\r\n\
             ownBrand\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"reviews.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             rating,text\r\n5,great\r\n\
             --{b}--\r\n",
            b = boundary
        )
        .into_bytes()
    }

    #[test]
    fn test_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=----abc123"),
            Some("----abc123".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/form-data; charset=utf-8; boundary=\"q r\""),
            Some("q r".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
    }

    #[test]
    fn test_parse_fields_and_files() {
        let mut form = parse_multipart(&form_body("XyZ"), "XyZ").unwrap();

        assert_eq!(form.field("fileType"), Some("ownBrand"));
        let file = form.take_file("file").unwrap();
        assert_eq!(file.original_name, "reviews.csv");
        assert_eq!(file.content_type, "text/csv");
        // CRLFs inside the content belong to the file
        assert_eq!(file.data, b"rating,text\r\n5,great");
        assert!(form.take_file("file").is_none());
    }

    #[test]
    fn test_truncated_body_is_malformed() {
        let body = b"--XyZ\r\nContent-Disposition: form-data; name=\"a\"\r\n\r\nvalue";
        assert!(matches!(parse_multipart(body, "XyZ"), Err(UploadError::Malformed(_))));
        assert!(matches!(parse_multipart(b"garbage", "XyZ"), Err(UploadError::Malformed(_))));
    }
}
