//! Storage for uploaded menu item images.
//!
//! Files live flat under the configured upload directory with generated
//! `{uuid}.{ext}` names; one owner per filename, no reference counting.

use std::path::{Path, PathBuf};

use anyhow::Context;
use uuid::Uuid;

use crate::core::app_error::AppError;

/// Maximum accepted upload size (5MB).
const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Accepted image extensions.
const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rejects empty names and anything that could escape the upload
    /// directory.
    pub fn is_valid_filename(filename: &str) -> bool {
        !filename.is_empty()
            && !filename.contains("..")
            && !filename.contains('/')
            && !filename.contains('\\')
    }

    /// Absolute path of a stored file, or `None` for names that fail the
    /// traversal check.
    pub fn path_of(&self, filename: &str) -> Option<PathBuf> {
        if Self::is_valid_filename(filename) {
            Some(self.root.join(filename))
        } else {
            None
        }
    }

    fn extension_of(original_name: &str) -> Result<String, AppError> {
        let ext = Path::new(original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .ok_or_else(|| {
                AppError::Validation(format!("Invalid file extension for: {original_name}"))
            })?;

        if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
            return Err(AppError::Validation(format!(
                "Unsupported file format '{}'. Supported: {}",
                ext,
                SUPPORTED_FORMATS.join(", ")
            )));
        }
        Ok(ext)
    }

    /// Validates and writes an upload, returning the generated filename to
    /// store on the menu item row.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String, AppError> {
        if data.is_empty() {
            return Err(AppError::Validation("Empty file provided".to_string()));
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(AppError::Validation(format!(
                "File too large. Maximum size is {}MB",
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }

        let ext = Self::extension_of(original_name)?;
        let filename = format!("{}.{}", Uuid::new_v4(), ext);

        tokio::fs::create_dir_all(&self.root)
            .await
            .context("Failed to create upload directory")?;
        tokio::fs::write(self.root.join(&filename), data)
            .await
            .context("Failed to save uploaded image")?;

        tracing::info!(
            original_name = %original_name,
            stored_as = %filename,
            size = data.len(),
            "Image uploaded"
        );
        Ok(filename)
    }

    /// Removes a stored file. A missing file is not an error: the row is the
    /// source of truth and the asset may already be gone.
    pub async fn delete(&self, filename: &str) -> Result<(), AppError> {
        let Some(path) = self.path_of(filename) else {
            return Err(AppError::Validation("Invalid filename".to_string()));
        };
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AppError::Other(
                anyhow::Error::new(err).context("Failed to delete image"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_traversal_is_rejected() {
        assert!(ImageStore::is_valid_filename("dish.jpg"));
        assert!(!ImageStore::is_valid_filename(""));
        assert!(!ImageStore::is_valid_filename("../secret"));
        assert!(!ImageStore::is_valid_filename("a/b.jpg"));
        assert!(!ImageStore::is_valid_filename("a\\b.jpg"));
    }

    #[test]
    fn test_extension_validation() {
        assert_eq!(ImageStore::extension_of("dish.JPG").unwrap(), "jpg");
        assert_eq!(ImageStore::extension_of("soup.webp").unwrap(), "webp");
        assert!(ImageStore::extension_of("nofileext").is_err());
        assert!(ImageStore::extension_of("script.exe").is_err());
    }

    #[tokio::test]
    async fn test_save_and_delete_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());

        let filename = store.save("dish.png", b"not-really-a-png").await.unwrap();
        assert!(filename.ends_with(".png"));
        assert!(dir.path().join(&filename).exists());

        store.delete(&filename).await.unwrap();
        assert!(!dir.path().join(&filename).exists());

        // Deleting again is a no-op success.
        store.delete(&filename).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_rejects_empty_upload() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path());
        assert!(store.save("dish.png", b"").await.is_err());
    }
}
