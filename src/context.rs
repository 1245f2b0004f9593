/// Application context and dependency injection
use crate::{
    config::ServerConfig,
    db,
    error::{BlogError, BlogResult},
    image_store::{store::UploadStoreConfig, PostImageManager, UploadStore},
    post::PostManager,
};
use std::sync::Arc;

/// Application context holding all shared services
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub upload_store: Arc<UploadStore>,
    pub post_images: Arc<PostImageManager>,
    pub post_manager: Arc<PostManager>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> BlogResult<Self> {
        // Validate configuration
        config.validate()?;

        // Create instance directory if it doesn't exist
        Self::ensure_directories(&config).await?;

        // Initialize database
        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        // Initialize upload store; the upload directory is created here
        let upload_store = Arc::new(UploadStore::new(UploadStoreConfig {
            upload_directory: config.storage.upload_directory.clone(),
        }));
        upload_store.ensure_dir().await?;

        let post_images = Arc::new(PostImageManager::new(db.clone(), Arc::clone(&upload_store)));
        let post_manager = Arc::new(PostManager::new(
            db,
            Arc::clone(&post_images),
            config.blog.posts_per_page,
        ));

        tracing::info!(
            "Storage ready: database {:?}, uploads {:?}",
            config.storage.database,
            config.storage.upload_directory
        );

        Ok(Self {
            config: Arc::new(config),
            upload_store,
            post_images,
            post_manager,
        })
    }

    /// Ensure required directories exist
    async fn ensure_directories(config: &ServerConfig) -> BlogResult<()> {
        let dir = &config.storage.instance_directory;
        if !dir.exists() {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                BlogError::StorageUnavailable(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        Ok(())
    }

    /// Get service URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_context_creates_instance_layout() {
        let dir = tempdir().unwrap();
        let instance = dir.path().join("instance");
        let config = ServerConfig::for_instance(&instance);

        let ctx = AppContext::new(config).await.unwrap();

        assert!(instance.is_dir());
        assert!(instance.join("uploads").is_dir());
        assert!(instance.join("blog.sqlite").exists());
        assert_eq!(ctx.post_images.lookup(1).await.unwrap(), None);
    }
}
