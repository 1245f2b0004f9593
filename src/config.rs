/// Configuration management for the blog server
use crate::error::{BlogError, BlogResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub blog: BlogConfig,
    pub logging: LoggingConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub hostname: String,
    pub port: u16,
    pub version: String,
    /// Maximum request body size accepted for image uploads
    pub upload_limit: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Instance folder holding the database and uploads by default
    pub instance_directory: PathBuf,
    pub database: PathBuf,
    pub upload_directory: PathBuf,
}

/// Blog presentation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogConfig {
    pub posts_per_page: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

const DEFAULT_UPLOAD_LIMIT: usize = 16 * 1024 * 1024;
const DEFAULT_POSTS_PER_PAGE: u32 = 5;
const DEFAULT_LOG_LEVEL: &str = "blog_server=debug,tower_http=debug";

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> BlogResult<Self> {
        dotenv::dotenv().ok();

        let hostname = env::var("BLOG_HOSTNAME").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("BLOG_PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .map_err(|_| BlogError::Validation("Invalid port number".to_string()))?;
        let upload_limit = env::var("BLOG_UPLOAD_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_UPLOAD_LIMIT);

        let instance_directory: PathBuf = env::var("BLOG_INSTANCE_DIR")
            .unwrap_or_else(|_| "./instance".to_string())
            .into();
        let database = env::var("BLOG_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| instance_directory.join("blog.sqlite"));
        let upload_directory = env::var("BLOG_UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| instance_directory.join("uploads"));

        let posts_per_page = env::var("BLOG_POSTS_PER_PAGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_POSTS_PER_PAGE);

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(ServerConfig {
            service: ServiceConfig {
                hostname,
                port,
                version: env!("CARGO_PKG_VERSION").to_string(),
                upload_limit,
            },
            storage: StorageConfig {
                instance_directory,
                database,
                upload_directory,
            },
            blog: BlogConfig { posts_per_page },
            logging: LoggingConfig { level: log_level },
        })
    }

    /// Default configuration rooted at an explicit instance directory.
    ///
    /// Used by tests and embedders that must not read the process environment.
    pub fn for_instance(instance_directory: impl AsRef<Path>) -> Self {
        let instance_directory = instance_directory.as_ref().to_path_buf();

        ServerConfig {
            service: ServiceConfig {
                hostname: "127.0.0.1".to_string(),
                port: 0,
                version: env!("CARGO_PKG_VERSION").to_string(),
                upload_limit: DEFAULT_UPLOAD_LIMIT,
            },
            storage: StorageConfig {
                database: instance_directory.join("blog.sqlite"),
                upload_directory: instance_directory.join("uploads"),
                instance_directory,
            },
            blog: BlogConfig {
                posts_per_page: DEFAULT_POSTS_PER_PAGE,
            },
            logging: LoggingConfig {
                level: DEFAULT_LOG_LEVEL.to_string(),
            },
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> BlogResult<()> {
        if self.service.hostname.is_empty() {
            return Err(BlogError::Validation("Hostname cannot be empty".to_string()));
        }

        if self.blog.posts_per_page == 0 {
            return Err(BlogError::Validation(
                "Posts per page must be at least 1".to_string(),
            ));
        }

        if self.storage.upload_directory.as_os_str().is_empty() {
            return Err(BlogError::Validation(
                "Upload directory cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}
