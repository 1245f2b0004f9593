/// API routes and handlers
pub mod images;
pub mod posts;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(images::routes())
        .merge(posts::routes())
}
