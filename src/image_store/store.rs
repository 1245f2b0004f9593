/// Upload Directory Store
///
/// Names, persists, serves and removes uploaded images.
use crate::{
    error::BlogResult,
    image_store::{disk::DiskUploadBackend, naming, UploadBackend, UploadedImage},
};
use std::path::PathBuf;
use std::sync::Arc;

/// Upload store configuration
#[derive(Debug, Clone)]
pub struct UploadStoreConfig {
    pub upload_directory: PathBuf,
}

/// Upload directory store
#[derive(Clone)]
pub struct UploadStore {
    backend: Arc<dyn UploadBackend>,
}

impl UploadStore {
    /// Create a store backed by the configured upload directory
    pub fn new(config: UploadStoreConfig) -> Self {
        Self::with_backend(Arc::new(DiskUploadBackend::new(config.upload_directory)))
    }

    pub fn with_backend(backend: Arc<dyn UploadBackend>) -> Self {
        Self { backend }
    }

    /// Create the upload directory if it is absent
    pub async fn ensure_dir(&self) -> BlogResult<()> {
        self.backend.ensure_ready().await
    }

    /// Persist an upload and return the stored filename.
    ///
    /// The name is `explicit_name` when given, otherwise a random identifier
    /// followed by the client's file extension. No content checks are done.
    pub async fn save(
        &self,
        upload: &UploadedImage,
        explicit_name: Option<&str>,
    ) -> BlogResult<String> {
        let filename = match explicit_name {
            Some(name) => name.to_string(),
            None => naming::random_filename(&upload.original_filename),
        };

        self.backend.put(&filename, &upload.data).await?;

        tracing::info!(
            "Saved image {} ({} bytes, uploaded as {:?})",
            filename,
            upload.data.len(),
            upload.original_filename
        );

        Ok(filename)
    }

    /// Raw bytes of a stored file
    pub async fn fetch(&self, filename: &str) -> BlogResult<Vec<u8>> {
        self.backend.get(filename).await
    }

    /// Delete a stored file, failing with `NotFound` if it is absent
    pub async fn remove(&self, filename: &str) -> BlogResult<()> {
        self.backend.delete(filename).await?;
        tracing::debug!("Removed image {}", filename);
        Ok(())
    }

    pub async fn exists(&self, filename: &str) -> BlogResult<bool> {
        self.backend.exists(filename).await
    }
}
