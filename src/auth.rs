use crate::config::AuthConfig;
use crate::error::ApiError;
use crate::models::user::UserDocument;
use crate::store::UserStore;
use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest, web};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;

/// Lifetime of an access token.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Account e-mail.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: usize,
}

pub fn issue_token(email: &str, settings: &AuthConfig) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: Some(email.to_string()),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::new(settings.jwt_algorithm),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

pub fn decode_token(token: &str, settings: &AuthConfig) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::new(settings.jwt_algorithm),
    )?;
    Ok(data.claims)
}

/// Hashes on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    Ok(web::block(move || bcrypt::hash(password, cost)).await??)
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    Ok(web::block(move || bcrypt::verify(password, &hash).unwrap_or(false)).await?)
}

/// Token from an `Authorization: Bearer <token>` header.
///
/// A missing header and a non-bearer scheme are both rejected with 403.
pub fn bearer_token(req: &HttpRequest) -> Result<String, ApiError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or_else(|| ApiError::Forbidden("Not authenticated".to_string()))?;

    let invalid = || ApiError::Forbidden("Invalid authentication credentials".to_string());
    let value = header.to_str().map_err(|_| invalid())?;
    let (scheme, token) = value.split_once(' ').ok_or_else(invalid)?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(invalid());
    }
    Ok(token.to_string())
}

/// The account behind the request's bearer token.
///
/// Requires `web::Data<AuthConfig>` and `web::Data<dyn UserStore>` to be
/// registered on the app.
#[derive(Debug)]
pub struct CurrentUser(pub UserDocument);

impl Deref for CurrentUser {
    type Target = UserDocument;

    fn deref(&self) -> &UserDocument {
        &self.0
    }
}

impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let settings = req.app_data::<web::Data<AuthConfig>>().cloned();
        let users = req.app_data::<web::Data<dyn UserStore>>().cloned();

        Box::pin(async move {
            let token = token?;
            let (Some(settings), Some(users)) = (settings, users) else {
                return Err(ApiError::Internal(
                    "auth settings or user store not registered".to_string(),
                ));
            };

            let rejected = || ApiError::Unauthorized("Invalid or expired token".to_string());
            let claims = decode_token(&token, &settings).map_err(|e| {
                tracing::debug!(event = "token_rejected", error = %e, "Bearer token rejected");
                rejected()
            })?;
            let email = claims.sub.ok_or_else(rejected)?;

            match users.find_by_email(&email).await? {
                Some(user) => Ok(CurrentUser(user)),
                None => Err(rejected()),
            }
        })
    }
}
