use async_trait::async_trait;
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("simulated storage failure")]
    Simulated,
}

// 1. LogoStorage Contract
/// LogoStorage
///
/// Defines the abstract contract for persisting uploaded organisation logos. Services only see
/// this trait, so the local-disk implementation can be replaced by the in-memory mock in tests.
#[async_trait]
pub trait LogoStorage: Send + Sync {
    /// Creates the upload directory if it is missing. Called once at startup.
    async fn ensure_directory(&self) -> Result<(), StorageError>;

    /// Persists `bytes` under `file_name` and returns the location it was written to.
    async fn save_logo(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError>;
}

/// sanitize_file_name
///
/// Strips directory components so a file name can never escape the upload directory.
/// Returns `None` when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> Option<String> {
    let cleaned = name
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .last()?;
    Some(cleaned.to_string())
}

// 2. The Real Implementation (local filesystem)
/// LocalLogoStorage
///
/// Writes logos into a fixed local directory (`LOGO_UPLOAD_DIR`). An existing file with the same
/// name is overwritten, which is what re-uploading a logo for the same organisation means.
#[derive(Clone, Debug)]
pub struct LocalLogoStorage {
    root: PathBuf,
}

impl LocalLogoStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

#[async_trait]
impl LogoStorage for LocalLogoStorage {
    async fn ensure_directory(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| StorageError::Write {
                path: self.root.display().to_string(),
                source,
            })
    }

    async fn save_logo(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let file_name = sanitize_file_name(file_name)
            .ok_or_else(|| StorageError::InvalidFileName(file_name.to_string()))?;

        self.ensure_directory().await?;

        let path = self.root.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.display().to_string(),
                source,
            })?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "logo written");
        Ok(path.display().to_string())
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockStorageService
///
/// In-memory `LogoStorage` for tests: records every write instead of touching the disk.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, all operations return a simulated failure.
    pub should_fail: bool,
    saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Every `(file_name, bytes)` pair written so far, oldest first.
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LogoStorage for MockStorageService {
    async fn ensure_directory(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn save_logo(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Simulated);
        }

        let file_name = sanitize_file_name(file_name)
            .ok_or_else(|| StorageError::InvalidFileName(file_name.to_string()))?;

        if let Ok(mut saved) = self.saved.lock() {
            saved.push((file_name.clone(), bytes.to_vec()));
        }

        Ok(format!("memory://logos/{file_name}"))
    }
}

/// StorageState
///
/// The concrete type used to share logo storage across the application state.
pub type StorageState = Arc<dyn LogoStorage>;
