/// Image Storage System
///
/// Persists uploaded post images in a flat upload directory and keeps the
/// one-image-per-post association in the database.

pub mod association;
pub mod disk;
pub mod models;
pub mod naming;
pub mod store;

pub use association::PostImageManager;
pub use models::*;
pub use store::UploadStore;

use crate::error::BlogResult;
use async_trait::async_trait;

/// Upload storage backend trait
///
/// Implementations store raw file content under a flat filename.
/// Missing files surface as `BlogError::NotFound`.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Make sure the backing location exists
    async fn ensure_ready(&self) -> BlogResult<()>;

    /// Store a file, silently replacing any file with the same name
    async fn put(&self, filename: &str, data: &[u8]) -> BlogResult<()>;

    /// Retrieve a file's raw bytes
    async fn get(&self, filename: &str) -> BlogResult<Vec<u8>>;

    /// Delete a file
    async fn delete(&self, filename: &str) -> BlogResult<()>;

    /// Check if a file exists
    async fn exists(&self, filename: &str) -> BlogResult<bool>;
}
