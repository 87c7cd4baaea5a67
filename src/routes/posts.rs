use crate::auth::CurrentUser;
use crate::error::{ApiError, ErrorResponse};
use crate::media::ImageHost;
use crate::models::MessageResponse;
use crate::models::post::{Comment, CommentRequest, PostDocument, PostOut};
use crate::routes::image_upload;
use crate::store::PostStore;
use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_web::{delete, post, routes, web};
use mongodb::bson::{DateTime, oid::ObjectId};

/// Ids that do not parse name no post.
fn parse_post_id(raw: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::post_not_found())
}

async fn load_post(posts: &dyn PostStore, id: &ObjectId) -> Result<PostDocument, ApiError> {
    posts
        .find_by_id(id)
        .await?
        .ok_or_else(ApiError::post_not_found)
}

#[derive(MultipartForm)]
pub struct NewPostForm {
    pub content: Text<String>,
    #[multipart(limit = "10MB")]
    pub file: Option<Bytes>,
}

/// # Create Post
///
/// Multipart form with `content` and an optional JPEG or PNG `file`.
#[utoipa::path(
    post,
    path = "/posts",
    responses(
        (status = 200, description = "Created post", body = PostOut),
        (status = 400, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Image upload failed", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[routes]
#[post("")]
#[post("/")]
pub async fn create_post(
    current: CurrentUser,
    MultipartForm(form): MultipartForm<NewPostForm>,
    posts: web::Data<dyn PostStore>,
    images: web::Data<dyn ImageHost>,
) -> Result<web::Json<PostOut>, ApiError> {
    let image = match image_upload(form.file)? {
        Some(upload) => Some(
            images
                .upload(upload)
                .await
                .map_err(|e| ApiError::Upload(format!("Image upload failed: {}", e)))?,
        ),
        None => None,
    };

    let mut post = PostDocument {
        id: None,
        user_id: current.id_hex(),
        user_name: current.name.clone(),
        user_profile_pic: current.profile_pic.clone(),
        content: form.content.0,
        image,
        created_at: DateTime::now(),
        comments: Vec::new(),
        likes: Vec::new(),
    };
    post.id = Some(posts.insert(post.clone()).await?);
    tracing::info!(event = "post_created", post_id = %post.id.map(|id| id.to_hex()).unwrap_or_default(), user_id = %post.user_id, "Post created");

    Ok(web::Json(PostOut::from(&post)))
}

/// # List Posts
///
/// Every post, newest first, with comments and like counts.
#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = Vec<PostOut>)
    ),
    tag = "Posts"
)]
#[routes]
#[get("")]
#[get("/")]
pub async fn list_posts(posts: web::Data<dyn PostStore>) -> Result<web::Json<Vec<PostOut>>, ApiError> {
    let posts = posts.list_recent().await?;
    Ok(web::Json(posts.iter().map(PostOut::from).collect()))
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/like",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post liked, or already liked", body = MessageResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[post("/{post_id}/like")]
pub async fn like_post(
    current: CurrentUser,
    path: web::Path<String>,
    posts: web::Data<dyn PostStore>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let id = parse_post_id(&path)?;
    let post = load_post(&**posts, &id).await?;
    let user_id = current.id_hex();

    if post.is_liked_by(&user_id) {
        return Ok(web::Json(MessageResponse::new("Already liked")));
    }
    posts.add_like(&id, &user_id).await?;
    Ok(web::Json(MessageResponse::new("Post liked")))
}

#[utoipa::path(
    post,
    path = "/posts/{post_id}/unlike",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post unliked", body = MessageResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[post("/{post_id}/unlike")]
pub async fn unlike_post(
    current: CurrentUser,
    path: web::Path<String>,
    posts: web::Data<dyn PostStore>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let id = parse_post_id(&path)?;
    load_post(&**posts, &id).await?;
    posts.remove_like(&id, &current.id_hex()).await?;
    Ok(web::Json(MessageResponse::new("Post unliked")))
}

/// # Delete Post
///
/// Only the author may delete a post.
#[utoipa::path(
    delete,
    path = "/posts/{post_id}",
    params(("post_id" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Post deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the author", body = ErrorResponse),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[delete("/{post_id}")]
pub async fn delete_post(
    current: CurrentUser,
    path: web::Path<String>,
    posts: web::Data<dyn PostStore>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let id = parse_post_id(&path)?;
    let post = load_post(&**posts, &id).await?;

    if post.user_id != current.id_hex() {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this post".to_string(),
        ));
    }
    posts.delete(&id).await?;
    tracing::info!(event = "post_deleted", post_id = %id, "Post deleted");
    Ok(web::Json(MessageResponse::new("Post deleted successfully")))
}

/// # Comment on Post
///
/// Appends a comment by the caller and returns the updated post.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment",
    params(("post_id" = String, Path, description = "Post id")),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Updated post", body = PostOut),
        (status = 404, description = "Post not found", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[post("/{post_id}/comment")]
pub async fn add_comment(
    current: CurrentUser,
    path: web::Path<String>,
    body: web::Json<CommentRequest>,
    posts: web::Data<dyn PostStore>,
) -> Result<web::Json<PostOut>, ApiError> {
    let id = parse_post_id(&path)?;
    let comment = Comment {
        user_id: current.id_hex(),
        user_name: current.name.clone(),
        text: body.into_inner().text,
        created_at: DateTime::now(),
    };

    if !posts.push_comment(&id, comment).await? {
        return Err(ApiError::post_not_found());
    }
    let post = load_post(&**posts, &id).await?;
    Ok(web::Json(PostOut::from(&post)))
}

/// # Delete Comment
///
/// Comments are addressed by their position in the post. Only the
/// comment's author may delete it.
#[utoipa::path(
    delete,
    path = "/posts/{post_id}/comment/{comment_index}",
    params(
        ("post_id" = String, Path, description = "Post id"),
        ("comment_index" = i64, Path, description = "Zero-based comment position")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Caller is not the comment author", body = ErrorResponse),
        (status = 404, description = "Post or comment not found", body = ErrorResponse)
    ),
    tag = "Posts"
)]
#[delete("/{post_id}/comment/{comment_index}")]
pub async fn delete_comment(
    current: CurrentUser,
    path: web::Path<(String, i64)>,
    posts: web::Data<dyn PostStore>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let (post_id, index) = path.into_inner();
    let id = parse_post_id(&post_id)?;
    let mut post = load_post(&**posts, &id).await?;

    let index = usize::try_from(index)
        .ok()
        .filter(|&i| i < post.comments.len())
        .ok_or_else(|| ApiError::NotFound("Comment not found".to_string()))?;

    if post.comments[index].user_id != current.id_hex() {
        return Err(ApiError::Forbidden(
            "Not authorized to delete this comment".to_string(),
        ));
    }

    post.comments.remove(index);
    posts.replace_comments(&id, post.comments).await?;
    Ok(web::Json(MessageResponse::new("Comment deleted successfully")))
}

/// Registers the feed routes; mounted under `/posts`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_posts)
        .service(create_post)
        .service(delete_post)
        .service(like_post)
        .service(unlike_post)
        .service(add_comment)
        .service(delete_comment);
}
