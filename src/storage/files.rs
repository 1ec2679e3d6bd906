//! Local file system storage for uploads

use crate::utils::error::{AppError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Uploaded files written flat into one directory
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    base_path: PathBuf,
}

impl LocalFileStorage {
    /// Create the storage, making the directory if it doesn't exist
    pub async fn new(base_path: &str) -> Result<Self> {
        let path = PathBuf::from(base_path);

        if !path.exists() {
            fs::create_dir_all(&path).await.map_err(|e| {
                AppError::FileStorage(format!("Failed to create storage directory: {}", e))
            })?;
        }

        info!("Local file storage initialized at: {}", path.display());
        Ok(Self { base_path: path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Write `content` under `filename`
    pub async fn store(&self, filename: &str, content: &[u8]) -> Result<()> {
        let file_path = self.file_path(filename)?;

        let mut file = fs::File::create(&file_path)
            .await
            .map_err(|e| AppError::FileStorage(format!("Failed to create file: {}", e)))?;

        file.write_all(content)
            .await
            .map_err(|e| AppError::FileStorage(format!("Failed to write file: {}", e)))?;

        debug!("Stored upload {} ({} bytes)", filename, content.len());
        Ok(())
    }

    /// Delete `filename`; a file that is already gone is not an error
    pub async fn remove(&self, filename: &str) -> Result<()> {
        match fs::remove_file(self.file_path(filename)?).await {
            Ok(()) => {
                debug!("Removed upload {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::FileStorage(format!("Failed to remove file: {}", e))),
        }
    }

    pub async fn exists(&self, filename: &str) -> Result<bool> {
        Ok(fs::try_exists(self.file_path(filename)?).await?)
    }

    /// Reject anything that could escape the base directory
    fn file_path(&self, filename: &str) -> Result<PathBuf> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.starts_with('.')
        {
            return Err(AppError::FileStorage(format!(
                "Invalid file name: {}",
                filename
            )));
        }
        Ok(self.base_path.join(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_and_exists() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("uploads");
        let storage = LocalFileStorage::new(root.to_str().unwrap()).await.unwrap();
        assert!(root.exists());

        storage.store("file-1-123456789.txt", b"hello").await.unwrap();
        assert!(storage.exists("file-1-123456789.txt").await.unwrap());
        assert_eq!(
            std::fs::read(root.join("file-1-123456789.txt")).unwrap(),
            b"hello"
        );

        storage.remove("file-1-123456789.txt").await.unwrap();
        assert!(!storage.exists("file-1-123456789.txt").await.unwrap());
        storage.remove("file-1-123456789.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path().to_str().unwrap())
            .await
            .unwrap();
        assert!(storage.store("../escape.txt", b"x").await.is_err());
        assert!(storage.store(".hidden", b"x").await.is_err());
    }
}
