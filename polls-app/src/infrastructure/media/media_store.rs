use crate::domain::Upload;
use crate::infrastructure::security::ImageFormat;
use polls_errors::AppError;
use std::path::{Path, PathBuf};

pub const AVATAR_DIR: &str = "avatars";
pub const QUESTION_IMAGE_DIR: &str = "question_image";

/// Writes uploads under a root directory and hands back the relative path
/// that gets stored in the database.
#[derive(Clone, Debug)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub async fn save(
        &self,
        dir: &str,
        upload: &Upload,
        format: ImageFormat,
    ) -> Result<String, AppError> {
        let target_dir = self.root.join(dir);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot create {}: {}", dir, e)))?;

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), format.extension());
        tokio::fs::write(target_dir.join(&file_name), &upload.bytes)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot store upload: {}", e)))?;

        let relative = format!("{}/{}", dir, file_name);
        tracing::info!(path = %relative, size = upload.bytes.len(), "Stored upload");
        Ok(relative)
    }

    /// Best effort; a missing file is not an error.
    pub async fn remove(&self, relative: &str) {
        if relative.contains("..") {
            return;
        }
        if let Err(e) = tokio::fs::remove_file(self.root.join(relative)).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %relative, "Failed to remove stored upload: {}", e);
            }
        }
    }
}
