/// Stored image serving endpoint
use crate::{
    context::AppContext,
    error::{BlogError, BlogResult},
};
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

/// Build image routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/images/:filename", get(get_image))
}

/// Serve a stored image inline
///
/// Content-Type is inferred from the file extension.
async fn get_image(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
) -> BlogResult<Response> {
    let data = ctx.upload_store.fetch(&filename).await?;
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, data.len().to_string())
        .header(header::CONTENT_DISPOSITION, "inline")
        .body(Body::from(data))
        .map_err(|e| BlogError::Internal(e.to_string()))
}
