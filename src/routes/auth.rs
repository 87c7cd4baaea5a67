use crate::auth::{CurrentUser, hash_password, issue_token, verify_password};
use crate::config::AuthConfig;
use crate::error::{ApiError, ErrorResponse};
use crate::mail::{Mailer, send_otp_in_background};
use crate::media::ImageHost;
use crate::models::MessageResponse;
use crate::models::user::{
    LoginRequest, LoginResponse, ProfileUpdate, SignupRequest, SignupResponse, UserDocument,
    UserOut, VerifyEmailRequest,
};
use crate::otp::{expiry_after, generate_otp, is_expired};
use crate::routes::image_upload;
use crate::store::{StoreError, UserStore};
use crate::validation::normalize_email;
use actix_multipart::form::MultipartForm;
use actix_multipart::form::bytes::Bytes;
use actix_multipart::form::text::Text;
use actix_web::{HttpResponse, get, post, put, web};

fn email_taken() -> ApiError {
    ApiError::BadRequest("Email already registered".to_string())
}

/// # Signup
///
/// Creates an unverified account and mails a one-time password to the
/// given address. The mail is sent after the response.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, OTP sent", body = SignupResponse),
        (status = 400, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Invalid email address", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[post("/signup")]
pub async fn signup(
    req: web::Json<SignupRequest>,
    users: web::Data<dyn UserStore>,
    mailer: web::Data<dyn Mailer>,
    settings: web::Data<AuthConfig>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();
    let email = normalize_email(&req.email)?;

    if users.find_by_email(&email).await?.is_some() {
        return Err(email_taken());
    }

    let password_hash = hash_password(req.password, settings.bcrypt_cost).await?;
    let otp = generate_otp();
    let mut user = UserDocument {
        id: None,
        name: req.name,
        bio: req.bio,
        email: email.clone(),
        password_hash,
        profile_pic: None,
        is_verified: false,
        otp: Some(otp.clone()),
        otp_expiry: Some(expiry_after(settings.otp_ttl_minutes)),
    };

    user.id = match users.insert(user.clone()).await {
        Ok(id) => Some(id),
        Err(StoreError::Duplicate) => return Err(email_taken()),
        Err(e) => return Err(e.into()),
    };
    tracing::info!(event = "user_signed_up", user_id = %user.id_hex(), "New account created");

    send_otp_in_background(mailer, email, otp);

    Ok(HttpResponse::Ok().json(SignupResponse {
        user: UserOut::from(&user),
        message: "Signup successful. OTP sent to email.".to_string(),
    }))
}

/// # Verify Email
///
/// Confirms an address with the OTP mailed at signup.
#[utoipa::path(
    post,
    path = "/auth/verify-email",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Verified, or already verified", body = MessageResponse),
        (status = 400, description = "Invalid or expired OTP", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[post("/verify-email")]
pub async fn verify_email(
    req: web::Json<VerifyEmailRequest>,
    users: web::Data<dyn UserStore>,
) -> Result<web::Json<MessageResponse>, ApiError> {
    let email = normalize_email(&req.email)?;
    let user = users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if user.is_verified {
        return Ok(web::Json(MessageResponse::new("Already verified")));
    }
    if user.otp.as_deref() != Some(req.otp.trim()) {
        return Err(ApiError::BadRequest("Invalid OTP".to_string()));
    }
    if user.otp_expiry.is_some_and(is_expired) {
        return Err(ApiError::BadRequest("OTP expired".to_string()));
    }

    users.mark_verified(&email).await?;
    tracing::info!(event = "email_verified", user_id = %user.id_hex(), "Email verified");
    Ok(web::Json(MessageResponse::new("Email verified successfully")))
}

/// # Login
///
/// Exchanges credentials of a verified account for a bearer token valid
/// for seven days.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Email not verified", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[post("/login")]
pub async fn login(
    req: web::Json<LoginRequest>,
    users: web::Data<dyn UserStore>,
    settings: web::Data<AuthConfig>,
) -> Result<web::Json<LoginResponse>, ApiError> {
    let req = req.into_inner();
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let email = normalize_email(&req.email).map_err(|_| invalid())?;
    let user = users.find_by_email(&email).await?.ok_or_else(invalid)?;

    if !verify_password(req.password, user.password_hash.clone()).await? {
        tracing::info!(event = "login_failed", user_id = %user.id_hex(), "Wrong password");
        return Err(invalid());
    }
    if !user.is_verified {
        return Err(ApiError::Forbidden(
            "Email not verified. Please verify your email before logging in.".to_string(),
        ));
    }

    let access_token = issue_token(&user.email, &settings)?;
    tracing::info!(event = "login_succeeded", user_id = %user.id_hex(), "User logged in");

    Ok(web::Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: UserOut::from(&user),
    }))
}

/// # Profile
///
/// The caller's own account.
#[utoipa::path(
    get,
    path = "/auth/profile",
    responses(
        (status = 200, description = "Current user", body = UserOut),
        (status = 401, description = "Invalid or expired token", body = ErrorResponse),
        (status = 403, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[get("/profile")]
pub async fn profile(current: CurrentUser) -> web::Json<UserOut> {
    web::Json(UserOut::from(&*current))
}

#[derive(MultipartForm)]
pub struct ProfileForm {
    pub name: Option<Text<String>>,
    pub bio: Option<Text<String>>,
    #[multipart(limit = "10MB")]
    pub file: Option<Bytes>,
}

/// # Update Profile
///
/// Multipart form with optional `name`, `bio` and `file` (JPEG or PNG).
/// Empty text fields leave the stored value unchanged.
#[utoipa::path(
    put,
    path = "/auth/profile/update",
    responses(
        (status = 200, description = "Updated user", body = UserOut),
        (status = 400, description = "Unsupported image type", body = ErrorResponse),
        (status = 500, description = "Profile picture upload failed", body = ErrorResponse)
    ),
    tag = "Auth"
)]
#[put("/profile/update")]
pub async fn update_profile(
    current: CurrentUser,
    MultipartForm(form): MultipartForm<ProfileForm>,
    users: web::Data<dyn UserStore>,
    images: web::Data<dyn ImageHost>,
) -> Result<web::Json<UserOut>, ApiError> {
    let non_empty = |field: Option<Text<String>>| field.map(|t| t.0).filter(|v| !v.is_empty());
    let mut update = ProfileUpdate {
        name: non_empty(form.name),
        bio: non_empty(form.bio),
        profile_pic: None,
    };

    if let Some(image) = image_upload(form.file)? {
        let url = images.upload(image).await.map_err(|e| {
            tracing::error!(event = "profile_picture_upload_failed", user_id = %current.id_hex(), error = %e, "Upload failed");
            ApiError::Upload("Profile picture upload failed".to_string())
        })?;
        update.profile_pic = Some(url);
    }

    let id = current
        .id
        .ok_or_else(|| ApiError::Internal("stored user without id".to_string()))?;
    if !update.is_empty() {
        users.update_profile(&id, update).await?;
    }

    let user = users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(web::Json(UserOut::from(&user)))
}

/// Registers the account routes; mounted under `/auth`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(signup)
        .service(verify_email)
        .service(login)
        .service(profile)
        .service(update_profile);
}
