//! Resume blob storage.

mod disk;

pub use disk::DiskResumeStore;

use async_trait::async_trait;
use axum::body::Bytes;

use crate::error::AppResult;
use crate::models::ResumeRef;

/// File received with a form submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Lowercased extension of the client-supplied file name.
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// External storage for resumes, keyed by an opaque public id.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Store the file; failures are `AppError::Storage`.
    async fn upload(&self, file: UploadedFile) -> AppResult<ResumeRef>;

    /// Store an independent copy of an existing blob under a new id.
    async fn duplicate(&self, public_id: &str) -> AppResult<ResumeRef>;

    /// Release a previously stored blob.
    async fn destroy(&self, public_id: &str) -> AppResult<()>;
}
