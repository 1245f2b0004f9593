/// Post manager implementation using runtime queries
use crate::{
    error::{BlogError, BlogResult},
    image_store::{PostImageManager, UploadedImage},
    post::{Post, PostInput, PostPage},
};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Post manager service
pub struct PostManager {
    db: SqlitePool,
    images: Arc<PostImageManager>,
    posts_per_page: u32,
}

impl PostManager {
    pub fn new(db: SqlitePool, images: Arc<PostImageManager>, posts_per_page: u32) -> Self {
        Self {
            db,
            images,
            posts_per_page: posts_per_page.max(1),
        }
    }

    fn validate(input: &PostInput) -> BlogResult<()> {
        if input.title.trim().is_empty() {
            return Err(BlogError::Validation("Title is required".to_string()));
        }
        Ok(())
    }

    /// Create a new post
    pub async fn create_post(&self, input: PostInput) -> BlogResult<Post> {
        Self::validate(&input)?;

        let now = Utc::now();
        let result = sqlx::query("INSERT INTO post (title, body, created_at) VALUES (?1, ?2, ?3)")
            .bind(&input.title)
            .bind(&input.body)
            .bind(now)
            .execute(&self.db)
            .await?;

        let id = result.last_insert_rowid();
        tracing::info!("Created post {}", id);

        Ok(Post {
            id,
            title: input.title,
            body: input.body,
            created_at: now,
        })
    }

    /// Get a post by id
    pub async fn get_post(&self, id: i64) -> BlogResult<Post> {
        sqlx::query_as::<_, Post>("SELECT id, title, body, created_at FROM post WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| BlogError::NotFound(format!("Post {} not found", id)))
    }

    /// List posts, newest first. Pages start at 1; page 0 is read as 1.
    pub async fn list_posts(&self, page: u32) -> BlogResult<PostPage> {
        let page = page.max(1);
        let limit = i64::from(self.posts_per_page);
        let offset = i64::from(page - 1).saturating_mul(limit);

        // Fetch one extra row to learn whether another page follows
        let mut posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, body, created_at FROM post ORDER BY id DESC LIMIT ?1 OFFSET ?2",
        )
        .bind(limit + 1)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;

        let has_next = posts.len() as i64 > limit;
        posts.truncate(self.posts_per_page as usize);

        Ok(PostPage {
            posts,
            page,
            has_next,
        })
    }

    /// Replace a post's title and body
    pub async fn update_post(&self, id: i64, input: PostInput) -> BlogResult<Post> {
        Self::validate(&input)?;

        let result = sqlx::query("UPDATE post SET title = ?1, body = ?2 WHERE id = ?3")
            .bind(&input.title)
            .bind(&input.body)
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(BlogError::NotFound(format!("Post {} not found", id)));
        }

        self.get_post(id).await
    }

    /// Attach an image to an existing post, replacing any previous one
    pub async fn attach_image(&self, id: i64, upload: &UploadedImage) -> BlogResult<String> {
        let guard = self.images.lock_post(id).await;
        self.get_post(id).await?;
        self.images.attach_locked(&guard, upload, None).await
    }

    /// Delete a post together with its image (row and file)
    pub async fn delete_post(&self, id: i64) -> BlogResult<()> {
        let guard = self.images.lock_post(id).await;

        // NotFound for a missing post
        self.get_post(id).await?;

        if self.images.lookup(id).await?.is_some() {
            self.images.detach_locked(&guard).await?;
        }

        sqlx::query("DELETE FROM post WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?;

        tracing::info!("Deleted post {}", id);

        Ok(())
    }
}
