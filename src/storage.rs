//! Object storage for uploaded review files
//!
//! Uploads land in a single bucket. The bucket is provisioned lazily and
//! idempotently through [`BucketGate`], which lets exactly one caller run
//! the create-if-absent step while concurrent callers wait for its outcome.

use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("bucket '{0}' already exists")]
    BucketExists(String),

    #[error("storage bucket '{bucket}' is not ready: {reason}")]
    NotReady { bucket: String, reason: String },

    #[error("object '{0}' not found")]
    NotFound(String),

    #[error("invalid object name '{0}'")]
    InvalidName(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage metadata error: {0}")]
    Metadata(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Minimal object-store surface the upload gateway needs
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;
    fn bucket_exists(&self) -> Result<bool>;
    /// Fails with [`StorageError::BucketExists`] when the bucket is already there
    fn create_bucket(&self) -> Result<()>;
    fn put(&self, name: &str, data: &[u8], content_type: &str) -> Result<()>;
    fn get(&self, name: &str) -> Result<Vec<u8>>;
}

// ============================================================================
// Filesystem-backed store
// ============================================================================

/// A bucket is a directory under `root`; objects are files inside it, each
/// with a JSON metadata sidecar.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
    bucket: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMeta<'a> {
    content_type: &'a str,
    size: usize,
    stored_at: String,
}

const META_SUFFIX: &str = ".meta.json";

impl FsObjectStore {
    pub fn new<P: AsRef<Path>>(root: P, bucket: &str) -> Self {
        Self { root: root.as_ref().to_path_buf(), bucket: bucket.to_string() }
    }

    pub fn bucket_dir(&self) -> PathBuf {
        self.root.join(&self.bucket)
    }

    fn object_path(&self, name: &str) -> Result<PathBuf> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.starts_with('.')
            || name.ends_with(META_SUFFIX);
        if invalid {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.bucket_dir().join(name))
    }

    fn require_bucket(&self) -> Result<()> {
        if self.bucket_exists()? {
            Ok(())
        } else {
            Err(StorageError::NotReady {
                bucket: self.bucket.clone(),
                reason: "bucket does not exist".to_string(),
            })
        }
    }
}

impl ObjectStore for FsObjectStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn bucket_exists(&self) -> Result<bool> {
        Ok(self.bucket_dir().is_dir())
    }

    fn create_bucket(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        match fs::create_dir(self.bucket_dir()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(StorageError::BucketExists(self.bucket.clone())),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, name: &str, data: &[u8], content_type: &str) -> Result<()> {
        let path = self.object_path(name)?;
        self.require_bucket()?;

        fs::write(&path, data)?;
        let meta = ObjectMeta {
            content_type,
            size: data.len(),
            stored_at: chrono::Utc::now().to_rfc3339(),
        };
        let mut meta_path = path.into_os_string();
        meta_path.push(META_SUFFIX);
        fs::write(meta_path, serde_json::to_vec(&meta)?)?;
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.object_path(name)?;
        self.require_bucket()?;
        match fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(StorageError::NotFound(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Bucket readiness
// ============================================================================

/// Single-flight guard around bucket provisioning.
///
/// The mutex is held for the whole create-if-absent attempt, so concurrent
/// first requests never race to create the bucket; later callers see the
/// ready flag and return immediately.
pub struct BucketGate {
    store: Arc<dyn ObjectStore>,
    ready: Mutex<bool>,
}

impl BucketGate {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store, ready: Mutex::new(false) }
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }

    pub fn is_ready(&self) -> bool {
        *self.ready.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the bucket if absent. Safe to call any number of times.
    pub fn initialize(&self) -> Result<()> {
        let mut ready = self.ready.lock().unwrap_or_else(PoisonError::into_inner);
        if *ready {
            return Ok(());
        }

        let bucket = self.store.bucket();
        if self.store.bucket_exists()? {
            debug!(bucket, "bucket already present");
        } else {
            match self.store.create_bucket() {
                Ok(()) => info!(bucket, "created storage bucket"),
                Err(StorageError::BucketExists(_)) => debug!(bucket, "bucket created concurrently"),
                Err(e) => return Err(e),
            }
        }

        *ready = true;
        Ok(())
    }

    /// Ready check used by request handlers: one inline initialization
    /// retry, then `NotReady`.
    pub fn ensure_ready(&self) -> Result<()> {
        if self.is_ready() {
            return Ok(());
        }
        warn!(bucket = self.store.bucket(), "storage not initialized, retrying");
        self.initialize().map_err(|e| match e {
            StorageError::NotReady { .. } => e,
            other => StorageError::NotReady {
                bucket: self.store.bucket().to_string(),
                reason: other.to_string(),
            },
        })
    }
}
