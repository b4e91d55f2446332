//! Resume store on the local filesystem, served back under `/uploads`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use super::{ResumeStore, UploadedFile};
use crate::error::{AppError, AppResult};
use crate::models::ResumeRef;

const FOLDER: &str = "Job_Seekers_Resume";
const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "png", "jpg", "jpeg", "webp"];

#[derive(Debug, Clone)]
pub struct DiskResumeStore {
    root: PathBuf,
    /// Base URL the `root` directory is served under, e.g. `http://host/uploads`.
    public_base_url: String,
}

impl DiskResumeStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a public id to a path under `root`, refusing anything that escapes it.
    fn resolve(&self, public_id: &str) -> AppResult<PathBuf> {
        let rel = Path::new(public_id);
        let safe = !public_id.is_empty()
            && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(AppError::Storage(format!("invalid resume id: {}", public_id)));
        }
        Ok(self.root.join(rel))
    }
}

/// Keep the stem readable but filesystem-safe.
fn sanitize_stem(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("resume");
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "resume".to_string()
    } else {
        cleaned
    }
}

#[async_trait]
impl ResumeStore for DiskResumeStore {
    async fn upload(&self, file: UploadedFile) -> AppResult<ResumeRef> {
        let ext = file
            .extension()
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "Unsupported resume file type. Allowed: {}",
                    ALLOWED_EXTENSIONS.join(", ")
                ))
            })?;

        let public_id = format!(
            "{}/{}-{}.{}",
            FOLDER,
            sanitize_stem(&file.file_name),
            Uuid::new_v4().as_simple(),
            ext
        );
        let path = self.resolve(&public_id)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| AppError::Storage(format!("Failed to upload resume: {}", e)))?;
        }
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload resume: {}", e)))?;

        info!(public_id = %public_id, size = file.bytes.len(), "resume stored");
        Ok(ResumeRef {
            url: format!("{}/{}", self.public_base_url, public_id),
            public_id,
        })
    }

    async fn duplicate(&self, public_id: &str) -> AppResult<ResumeRef> {
        let source = self.resolve(public_id)?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
            .ok_or_else(|| AppError::Storage(format!("resume {} has no usable extension", public_id)))?;
        let copy_id = format!("{}/copy-{}.{}", FOLDER, Uuid::new_v4().as_simple(), ext);
        let target = self.resolve(&copy_id)?;
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to copy resume {}: {}", public_id, e)))?;

        debug!(from = %public_id, to = %copy_id, "resume duplicated");
        Ok(ResumeRef {
            url: format!("{}/{}", self.public_base_url, copy_id),
            public_id: copy_id,
        })
    }

    async fn destroy(&self, public_id: &str) -> AppResult<()> {
        let path = self.resolve(public_id)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete resume {}: {}", public_id, e)))?;
        debug!(public_id = %public_id, "resume released");
        Ok(())
    }
}
