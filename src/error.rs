//! HTTP-facing error taxonomy
//!
//! Every handler failure ends up as one of these variants, which fixes the
//! status code and the `{"error": ...}` body sent back.

use crate::db::DbError;
use crate::generator::GenerateError;
use crate::model::UnknownLanguage;
use crate::storage::StorageError;
use crate::upload::UploadError;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or invalid request fields, wrong file type, oversized file
    #[error("{0}")]
    Validation(String),

    /// Storage bucket not initialized even after a retry
    #[error("{0}")]
    NotReady(String),

    /// Storage upload/download failed; the upstream message is surfaced
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::NotReady(_) => 503,
            ApiError::Upstream(_) | ApiError::Internal(_) => 500,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody { error: self.to_string() }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<GenerateError> for ApiError {
    fn from(e: GenerateError) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<UnknownLanguage> for ApiError {
    fn from(e: UnknownLanguage) -> Self {
        ApiError::Validation(e.to_string())
    }
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotReady { .. } => ApiError::NotReady(e.to_string()),
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

impl From<DbError> for ApiError {
    fn from(e: DbError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}
