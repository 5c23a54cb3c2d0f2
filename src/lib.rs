//! VOC Insights - customer review analysis dashboard
//!
//! Upload review exports for your own brand (and optionally a competitor),
//! name a product category, and get back a bilingual (English / Chinese)
//! report: consumer personas, usage scenarios, what customers love, unmet
//! needs, purchase drivers, a star-rating breakdown and opportunities.
//!
//! # Overview
//!
//! The backend is deliberately thin:
//!
//! 1. **Upload**: CSV / Excel files are validated (type, 10 MiB ceiling) and
//!    stored in a bucket under `{fileType}-{unixMillis}-{sanitizedName}`.
//!
//! 2. **Analyze**: the generator fills a bilingual template bank with the
//!    category name. Uploaded files are read back but do not shape the
//!    output; the report is category-templated.
//!
//! 3. **Render**: the dashboard maps report sections to donut and scatter
//!    charts, formatted tables, section navigation and a quote modal.
//!
//! # Quick Start
//!
//! ```no_run
//! use voc_insights::{AnalysisRequest, Generator, Language};
//!
//! let report = Generator::new()
//!     .generate(&AnalysisRequest {
//!         own_brand_file: "ownBrand-1700000000000-reviews.csv".to_string(),
//!         competitor_file: None,
//!         target_category: "Smart Watch".to_string(),
//!         language: Language::Zh,
//!     })
//!     .unwrap();
//!
//! voc_insights::report::generate("smart-watch.html", &report).unwrap();
//! ```
//!
//! # Modules
//!
//! - [`model`]: the report schema
//! - [`generator`] / [`templates`]: templated report generation
//! - [`upload`] / [`storage`]: upload validation and the object bucket
//! - [`db`]: SQLite report store
//! - [`serve`]: HTTP API
//! - [`dashboard`]: chart, table, navigation and collapse logic
//! - [`report`]: HTML / JSON export

pub mod config;
pub mod dashboard;
pub mod db;
pub mod demo;
pub mod error;
pub mod generator;
pub mod model;
pub mod report;
pub mod schema;
pub mod serve;
pub mod storage;
pub mod templates;
pub mod upload;

pub use config::ServerConfig;
pub use db::{Database, DbError};
pub use error::ApiError;
pub use generator::{AnalysisRequest, GenerateError, Generator};
pub use model::{AnalysisReport, Language, ReportSummary, RowId, SectionId};
pub use serve::{route, AppState, Reply};
pub use storage::{BucketGate, FsObjectStore, ObjectStore, StorageError};
