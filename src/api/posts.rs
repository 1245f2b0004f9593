/// Post and post image endpoints
use crate::{
    context::AppContext,
    error::{BlogError, BlogResult},
    image_store::{ImageRef, UploadedImage},
    post::{Post, PostInput, PostPage},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Multipart field carrying the uploaded image
const IMAGE_FIELD: &str = "image";

/// Build post routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route(
            "/posts/:id",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route(
            "/posts/:id/image",
            get(get_post_image)
                .post(upload_post_image)
                .delete(delete_post_image),
        )
}

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
}

/// Post together with its attached image
#[derive(Debug, Serialize)]
struct PostView {
    #[serde(flatten)]
    post: Post,
    image: Option<ImageRef>,
}

async fn list_posts(
    State(ctx): State<AppContext>,
    Query(params): Query<ListParams>,
) -> BlogResult<Json<PostPage>> {
    let page = ctx
        .post_manager
        .list_posts(params.page.unwrap_or(1))
        .await?;
    Ok(Json(page))
}

async fn create_post(
    State(ctx): State<AppContext>,
    Json(input): Json<PostInput>,
) -> BlogResult<impl IntoResponse> {
    let post = ctx.post_manager.create_post(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

async fn get_post(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> BlogResult<Json<PostView>> {
    let post = ctx.post_manager.get_post(id).await?;
    let image = ctx.post_images.lookup(id).await?.map(ImageRef::new);
    Ok(Json(PostView { post, image }))
}

async fn update_post(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> BlogResult<Json<Post>> {
    let post = ctx.post_manager.update_post(id, input).await?;
    Ok(Json(post))
}

async fn delete_post(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> BlogResult<StatusCode> {
    ctx.post_manager.delete_post(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach an image to a post, replacing any previous one
///
/// Expects a multipart body with a file in the `image` field.
async fn upload_post_image(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> BlogResult<impl IntoResponse> {
    let upload = read_image_field(&mut multipart).await?;
    let filename = ctx.post_manager.attach_image(id, &upload).await?;

    Ok((StatusCode::CREATED, Json(ImageRef::new(filename))))
}

async fn get_post_image(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> BlogResult<Json<ImageRef>> {
    let filename = ctx
        .post_images
        .lookup(id)
        .await?
        .ok_or(BlogError::NoAssociation(id))?;
    Ok(Json(ImageRef::new(filename)))
}

async fn delete_post_image(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
) -> BlogResult<StatusCode> {
    ctx.post_images.detach(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Pull the `image` file field out of a multipart body
async fn read_image_field(multipart: &mut Multipart) -> BlogResult<UploadedImage> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| BlogError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let original_filename = field.file_name().unwrap_or_default().to_string();
        if original_filename.is_empty() {
            return Err(BlogError::Validation("No image file selected".to_string()));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| BlogError::Validation(format!("Failed to read upload: {}", e)))?;

        return Ok(UploadedImage::new(original_filename, data.to_vec()));
    }

    Err(BlogError::Validation(format!(
        "Missing multipart field '{}'",
        IMAGE_FIELD
    )))
}
