use crate::error::ApiError;
use crate::media::{ImageUpload, is_allowed_image_type};
use actix_multipart::form::MultipartFormConfig;
use actix_multipart::form::bytes::Bytes;
use actix_web::web;

/// In-memory ceiling for one multipart form: a 10 MB image plus its text
/// fields.
pub const MULTIPART_MEMORY_LIMIT: usize = 12 * 1024 * 1024;

/// # Health Check Endpoint
///
/// `GET /health` answers `{"status": "ok"}` with 200 while the process is up.
pub mod health;

/// # Account Endpoints
///
/// Signup with e-mail OTP verification, login returning a bearer token, and
/// the caller's profile.
///
/// ```text
/// POST /auth/signup
/// POST /auth/verify-email
/// POST /auth/login
/// GET  /auth/profile
/// PUT  /auth/profile/update
/// ```
pub mod auth;

/// # Feed Endpoints
///
/// Posts with optional images, likes and comments.
///
/// ```text
/// GET    /posts
/// POST   /posts
/// DELETE /posts/{post_id}
/// POST   /posts/{post_id}/like
/// POST   /posts/{post_id}/unlike
/// POST   /posts/{post_id}/comment
/// DELETE /posts/{post_id}/comment/{comment_index}
/// ```
pub mod posts;



/// # API Route Configuration
///
/// Mounts the health check at the root and the account and feed routes
/// under `/auth` and `/posts`, and registers the extractor configs so that
/// rejected bodies and paths answer with the usual `{"detail": ...}` JSON.
/// Handlers expect these `web::Data` entries: `AuthConfig`,
/// `dyn UserStore`, `dyn PostStore`, `dyn Mailer` and `dyn ImageHost`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|e, _| ApiError::BadRequest(e.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|e, _| ApiError::BadRequest(e.to_string()).into()),
    )
    .app_data(
        MultipartFormConfig::default()
            .memory_limit(MULTIPART_MEMORY_LIMIT)
            .error_handler(|e, _| ApiError::BadRequest(e.to_string()).into()),
    );

    cfg.configure(health::configure_routes)
        .service(web::scope("/auth").configure(auth::configure_routes))
        .service(web::scope("/posts").configure(posts::configure_routes));
}

/// Turns an optional multipart file field into an upload.
///
/// Browsers submit an empty part when no file was chosen; that counts as
/// no file. Anything other than JPEG or PNG is rejected with 400.
pub(crate) fn image_upload(file: Option<Bytes>) -> Result<Option<ImageUpload>, ApiError> {
    let Some(file) = file.filter(|f| !f.data.is_empty()) else {
        return Ok(None);
    };

    let content_type = file
        .content_type
        .as_ref()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_default();
    if !is_allowed_image_type(&content_type) {
        return Err(ApiError::BadRequest(
            "Only JPEG or PNG images allowed".to_string(),
        ));
    }

    Ok(Some(ImageUpload {
        file_name: file.file_name.unwrap_or_else(|| "upload".to_string()),
        content_type,
        data: file.data.to_vec(),
    }))
}
