/// Disk-based upload storage backend
use crate::{
    error::{BlogError, BlogResult},
    image_store::UploadBackend,
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Stores files directly inside one flat upload directory.
#[derive(Clone)]
pub struct DiskUploadBackend {
    base_path: PathBuf,
}

impl DiskUploadBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Resolve a filename inside the upload directory.
    ///
    /// Returns `None` for names that are not a single flat path component.
    fn get_file_path(&self, filename: &str) -> Option<PathBuf> {
        if is_flat_filename(filename) {
            Some(self.base_path.join(filename))
        } else {
            None
        }
    }

    fn not_found(filename: &str) -> BlogError {
        BlogError::NotFound(format!("Image not found: {}", filename))
    }
}

/// A flat filename has no directory components and cannot escape the
/// upload directory.
pub fn is_flat_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.starts_with('.')
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.chars().any(|c| c.is_control())
}

#[async_trait]
impl UploadBackend for DiskUploadBackend {
    async fn ensure_ready(&self) -> BlogResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            BlogError::StorageUnavailable(format!(
                "Failed to create upload directory {:?}: {}",
                self.base_path, e
            ))
        })
    }

    async fn put(&self, filename: &str, data: &[u8]) -> BlogResult<()> {
        let path = self
            .get_file_path(filename)
            .ok_or_else(|| BlogError::Validation(format!("Invalid filename: {:?}", filename)))?;

        fs::write(&path, data).await.map_err(|e| {
            BlogError::StorageUnavailable(format!("Failed to write image {}: {}", filename, e))
        })?;

        Ok(())
    }

    async fn get(&self, filename: &str) -> BlogResult<Vec<u8>> {
        let path = self
            .get_file_path(filename)
            .ok_or_else(|| Self::not_found(filename))?;

        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Self::not_found(filename)),
            Err(e) => Err(BlogError::StorageUnavailable(format!(
                "Failed to read image {}: {}",
                filename, e
            ))),
        }
    }

    async fn delete(&self, filename: &str) -> BlogResult<()> {
        let path = self
            .get_file_path(filename)
            .ok_or_else(|| Self::not_found(filename))?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Self::not_found(filename)),
            Err(e) => Err(BlogError::StorageUnavailable(format!(
                "Failed to delete image {}: {}",
                filename, e
            ))),
        }
    }

    async fn exists(&self, filename: &str) -> BlogResult<bool> {
        let Some(path) = self.get_file_path(filename) else {
            return Ok(false);
        };

        match fs::metadata(&path).await {
            Ok(metadata) => Ok(metadata.is_file()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlogError::StorageUnavailable(format!(
                "Failed to stat image {}: {}",
                filename, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_put_and_get_file() {
        let dir = tempdir().unwrap();
        let backend = DiskUploadBackend::new(dir.path().to_path_buf());

        let data = b"test image data".to_vec();
        backend.put("abc123.png", &data).await.unwrap();

        assert!(dir.path().join("abc123.png").exists());
        assert_eq!(backend.get("abc123.png").await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_get_nonexistent_file() {
        let dir = tempdir().unwrap();
        let backend = DiskUploadBackend::new(dir.path().to_path_buf());

        let result = backend.get("nonexistent.png").await;
        assert!(matches!(result, Err(BlogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_file() {
        let dir = tempdir().unwrap();
        let backend = DiskUploadBackend::new(dir.path().to_path_buf());

        backend.put("delete-me.gif", b"to be deleted").await.unwrap();
        assert!(backend.exists("delete-me.gif").await.unwrap());

        backend.delete("delete-me.gif").await.unwrap();
        assert!(!backend.exists("delete-me.gif").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let backend = DiskUploadBackend::new(dir.path().to_path_buf());

        let result = backend.delete("ghost.png").await;
        assert!(matches!(result, Err(BlogError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let backend = DiskUploadBackend::new(dir.path().to_path_buf());

        backend.put("same.png", b"first").await.unwrap();
        backend.put("same.png", b"second").await.unwrap();

        assert_eq!(backend.get("same.png").await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_traversal_names_never_resolve() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let backend = DiskUploadBackend::new(uploads);
        backend.ensure_ready().await.unwrap();

        std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

        assert!(matches!(
            backend.get("../secret.txt").await,
            Err(BlogError::NotFound(_))
        ));
        assert!(!backend.exists("../secret.txt").await.unwrap());
        assert!(matches!(
            backend.put("../escape.png", b"x").await,
            Err(BlogError::Validation(_))
        ));
        assert!(!dir.path().join("escape.png").exists());
    }

    #[tokio::test]
    async fn test_put_into_missing_directory_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let backend = DiskUploadBackend::new(uploads.clone());
        backend.ensure_ready().await.unwrap();

        std::fs::remove_dir_all(&uploads).unwrap();

        let result = backend.put("lost.png", b"data").await;
        assert!(matches!(result, Err(BlogError::StorageUnavailable(_))));
    }

    #[tokio::test]
    async fn test_ensure_ready_over_a_file_is_storage_unavailable() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("uploads");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let backend = DiskUploadBackend::new(blocker);
        assert!(matches!(
            backend.ensure_ready().await,
            Err(BlogError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_ensure_ready_creates_directory() {
        let dir = tempdir().unwrap();
        let uploads = dir.path().join("instance").join("uploads");
        let backend = DiskUploadBackend::new(uploads.clone());

        backend.ensure_ready().await.unwrap();
        assert!(uploads.is_dir());

        // Second call is a no-op
        backend.ensure_ready().await.unwrap();
    }

    #[test]
    fn test_is_flat_filename() {
        assert!(is_flat_filename("0f1e2d3c.png"));
        assert!(is_flat_filename("forced123.png"));
        assert!(is_flat_filename("no-extension"));
        assert!(!is_flat_filename(""));
        assert!(!is_flat_filename(".."));
        assert!(!is_flat_filename(".hidden"));
        assert!(!is_flat_filename("dir/file.png"));
        assert!(!is_flat_filename("dir\\file.png"));
        assert!(!is_flat_filename("bad\0name"));
        assert!(!is_flat_filename("bad\r\nname"));
    }
}
