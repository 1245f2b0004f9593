/// Post-Image Association Manager
///
/// Owns the lifecycle of the `post_image` row and the stored file behind it.
/// A post is either without an image or has exactly one:
///
/// ```text
/// NoImage --attach--> HasImage(filename) --attach--> HasImage(new filename)
///    ^                        |
///    +--------detach----------+
/// ```
///
/// Filesystem and database writes are not atomic with respect to each other.
/// A failing step propagates immediately without undoing earlier steps, so a
/// failed insert after a successful save leaves an orphan file behind.
use crate::{
    error::{BlogError, BlogResult},
    image_store::{PostImage, UploadStore, UploadedImage},
};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// In-process mutual exclusion keyed by post id.
///
/// Serializes the lookup-then-mutate sequences of attach and detach so two
/// requests for the same post cannot both observe "no image".
#[derive(Default)]
pub struct PostLocks {
    locks: Mutex<HashMap<i64, Arc<AsyncMutex<()>>>>,
}

/// Held for the duration of one post's critical section
pub struct PostLockGuard<'a> {
    owner: &'a PostLocks,
    post_id: i64,
    lock: Arc<AsyncMutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PostLockGuard<'_> {
    pub fn post_id(&self) -> i64 {
        self.post_id
    }
}

impl PostLocks {
    pub async fn acquire(&self, post_id: i64) -> PostLockGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(post_id).or_default())
        };

        // Built before waiting so a cancelled waiter still cleans up its entry
        let mut held = PostLockGuard {
            owner: self,
            post_id,
            lock,
            guard: None,
        };
        held.guard = Some(Arc::clone(&held.lock).lock_owned().await);
        held
    }

    /// Number of posts with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for PostLockGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();

        let mut locks = self.owner.locks.lock().unwrap_or_else(|e| e.into_inner());
        // One reference in the map plus ours: nobody else holds or waits.
        if Arc::strong_count(&self.lock) == 2 {
            locks.remove(&self.post_id);
        }
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

/// Post-image association manager
pub struct PostImageManager {
    db: SqlitePool,
    store: Arc<UploadStore>,
    locks: PostLocks,
}

impl PostImageManager {
    pub fn new(db: SqlitePool, store: Arc<UploadStore>) -> Self {
        Self {
            db,
            store,
            locks: PostLocks::default(),
        }
    }

    /// Hold the per-post lock across a multi-step sequence.
    ///
    /// Pass the guard to the `*_locked` operations.
    pub async fn lock_post(&self, post_id: i64) -> PostLockGuard<'_> {
        self.locks.acquire(post_id).await
    }

    /// Upload store backing this manager
    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    /// Filename of the image attached to a post, if any
    pub async fn lookup(&self, post_id: i64) -> BlogResult<Option<String>> {
        let row = sqlx::query_as::<_, PostImage>(
            "SELECT post_id, filename FROM post_image WHERE post_id = ? LIMIT 1",
        )
        .bind(post_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| r.filename))
    }

    /// Record an association for a file already in the upload directory
    pub async fn associate(&self, post_id: i64, filename: &str) -> BlogResult<()> {
        if !self.store.exists(filename).await? {
            return Err(BlogError::NotFound(format!(
                "Image not found in upload directory: {}",
                filename
            )));
        }

        sqlx::query("INSERT INTO post_image (post_id, filename) VALUES (?, ?)")
            .bind(post_id)
            .bind(filename)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Save an upload and make it the post's only image.
    ///
    /// Any image already attached to the post is detached first (row and file).
    pub async fn attach(&self, post_id: i64, upload: &UploadedImage) -> BlogResult<String> {
        self.attach_inner(post_id, upload, None).await
    }

    /// Same as [`attach`](Self::attach) with a caller-chosen filename
    pub async fn attach_with_name(
        &self,
        post_id: i64,
        upload: &UploadedImage,
        filename: &str,
    ) -> BlogResult<String> {
        self.attach_inner(post_id, upload, Some(filename)).await
    }

    async fn attach_inner(
        &self,
        post_id: i64,
        upload: &UploadedImage,
        explicit_name: Option<&str>,
    ) -> BlogResult<String> {
        let guard = self.locks.acquire(post_id).await;
        self.attach_locked(&guard, upload, explicit_name).await
    }

    /// [`attach`](Self::attach) for a caller already holding the post's lock
    pub async fn attach_locked(
        &self,
        guard: &PostLockGuard<'_>,
        upload: &UploadedImage,
        explicit_name: Option<&str>,
    ) -> BlogResult<String> {
        let post_id = guard.post_id;

        if self.lookup(post_id).await?.is_some() {
            self.detach_locked(guard).await?;
        }

        let filename = self.store.save(upload, explicit_name).await?;

        if let Err(e) = self.associate(post_id, &filename).await {
            tracing::error!(
                "Failed to associate image {} with post {}; file left orphaned: {}",
                filename,
                post_id,
                e
            );
            return Err(e);
        }

        tracing::info!("Attached image {} to post {}", filename, post_id);

        Ok(filename)
    }

    /// Remove a post's image row and file.
    ///
    /// Fails with `NoAssociation` when the post has no image.
    pub async fn detach(&self, post_id: i64) -> BlogResult<()> {
        let guard = self.locks.acquire(post_id).await;
        self.detach_locked(&guard).await
    }

    /// [`detach`](Self::detach) for a caller already holding the post's lock
    pub async fn detach_locked(&self, guard: &PostLockGuard<'_>) -> BlogResult<()> {
        let post_id = guard.post_id;
        let filename = self
            .lookup(post_id)
            .await?
            .ok_or(BlogError::NoAssociation(post_id))?;

        self.store.remove(&filename).await?;

        sqlx::query("DELETE FROM post_image WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.db)
            .await?;

        tracing::info!("Detached image {} from post {}", filename, post_id);

        Ok(())
    }
}
