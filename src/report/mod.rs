//! Report export
//!
//! Writes a stored analysis to disk:
//!
//! - **HTML**: the full interactive dashboard (D3.js charts, navigation, quote modal)
//! - **JSON**: the report document exactly as the API serves it
//!
//! # Usage
//!
//! ```ignore
//! use voc_insights::report;
//!
//! // Picks the format from the extension
//! report::generate("kettle.html", &report)?;  // HTML
//! report::generate("kettle.json", &report)?;  // JSON
//! ```

pub mod html;
pub mod json;

use crate::model::AnalysisReport;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Html,
    Json,
}

impl Format {
    /// Format for a path; anything that is not `.json` gets the dashboard
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        match ext.as_str() {
            "json" => Format::Json,
            _ => Format::Html,
        }
    }
}

/// Generate a report in the format picked by the file extension
pub fn generate<P: AsRef<Path>>(path: P, report: &AnalysisReport) -> io::Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)?;

    match Format::for_path(path) {
        Format::Html => html::write(&mut file, report),
        Format::Json => json::write(&mut file, report),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::{AnalysisRequest, Generator};
    use crate::model::Language;

    fn report() -> AnalysisReport {
        Generator::new()
            .generate(&AnalysisRequest {
                own_brand_file: "ownBrand-1-a.csv".to_string(),
                competitor_file: None,
                target_category: "Kettle".to_string(),
                language: Language::En,
            })
            .unwrap()
    }

    // ==========================================================================
    // FORMAT DISPATCH
    // ==========================================================================

    #[test]
    fn test_format_for_path() {
        assert_eq!(Format::for_path(Path::new("out.json")), Format::Json);
        assert_eq!(Format::for_path(Path::new("OUT.JSON")), Format::Json);
        assert_eq!(Format::for_path(Path::new("out.html")), Format::Html);
        assert_eq!(Format::for_path(Path::new("out.htm")), Format::Html);
        assert_eq!(Format::for_path(Path::new("out")), Format::Html);
    }

    #[test]
    fn test_generate_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let report = report();

        let json_path = dir.path().join("r.json");
        generate(&json_path, &report).unwrap();
        let loaded: AnalysisReport = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(loaded, report);

        let html_path = dir.path().join("r.html");
        generate(&html_path, &report).unwrap();
        assert!(std::fs::read_to_string(&html_path).unwrap().starts_with("<!DOCTYPE html>"));
    }
}
