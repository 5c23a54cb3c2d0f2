//! Server configuration
//!
//! Flags on `voc-insights serve`, each with an environment fallback.

use crate::upload::MAX_UPLOAD_BYTES;
use clap::Args;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, env = "VOC_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "VOC_PORT", default_value = "3001")]
    pub port: u16,

    /// SQLite database holding generated reports
    #[arg(long, env = "VOC_DB_PATH", default_value = "voc-insights.db")]
    pub db_path: PathBuf,

    /// Directory that holds storage buckets
    #[arg(long, env = "VOC_STORAGE_ROOT", default_value = "voc-storage")]
    pub storage_root: PathBuf,

    /// Bucket for uploaded review files
    #[arg(long, env = "VOC_BUCKET", default_value = "reviews")]
    pub bucket: String,

    /// Upload size ceiling in bytes
    #[arg(long, env = "VOC_MAX_UPLOAD_BYTES", default_value_t = MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Request worker threads
    #[arg(long, env = "VOC_WORKERS", default_value = "4")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            db_path: PathBuf::from("voc-insights.db"),
            storage_root: PathBuf::from("voc-storage"),
            bucket: "reviews".to_string(),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            workers: 4,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        let host = if self.host == "0.0.0.0" || self.host == "127.0.0.1" { "localhost" } else { &self.host };
        format!("http://{}:{}", host, self.port)
    }
}
