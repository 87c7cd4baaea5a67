use utoipa::OpenApi;

/// OpenAPI document for the StudentHub backend.
///
/// Served at `/api-docs/openapi.json` and rendered by Swagger UI under
/// `/swagger-ui/`. Generated at compile time from the `#[utoipa::path]`
/// annotations on the handlers.
///
/// # Tags
/// 1. **Health Check**: liveness probe
/// 2. **Auth**: signup, e-mail verification, login and profile
/// 3. **Posts**: the shared feed
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::auth::signup,
        crate::routes::auth::verify_email,
        crate::routes::auth::login,
        crate::routes::auth::profile,
        crate::routes::auth::update_profile,
        crate::routes::posts::create_post,
        crate::routes::posts::list_posts,
        crate::routes::posts::like_post,
        crate::routes::posts::unlike_post,
        crate::routes::posts::delete_post,
        crate::routes::posts::add_comment,
        crate::routes::posts::delete_comment,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::MessageResponse,
            crate::error::ErrorResponse,
            crate::models::user::SignupRequest,
            crate::models::user::SignupResponse,
            crate::models::user::VerifyEmailRequest,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::UserOut,
            crate::models::post::PostOut,
            crate::models::post::CommentOut,
            crate::models::post::CommentRequest,
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Auth", description = "Accounts, e-mail verification and bearer tokens"),
        (name = "Posts", description = "Feed posts, likes and comments")
    ),
    info(
        description = "Backend for the StudentHub student collaboration platform",
        title = "StudentHub API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
