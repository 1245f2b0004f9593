/// Image storage data models
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An uploaded file as received from the client
#[derive(Debug, Clone)]
pub struct UploadedImage {
    /// Filename reported by the client; only its extension is kept
    pub original_filename: String,
    pub data: Vec<u8>,
}

impl UploadedImage {
    pub fn new(original_filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            original_filename: original_filename.into(),
            data: data.into(),
        }
    }
}

/// Association row linking a post to its stored image
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PostImage {
    pub post_id: i64,
    pub filename: String,
}

/// Image reference returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRef {
    pub filename: String,
    pub url: String,
}

impl ImageRef {
    pub fn new(filename: String) -> Self {
        let url = format!("/images/{}", filename);
        Self { filename, url }
    }
}
