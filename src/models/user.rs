use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored shape of a student account in the `users_v2` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub email: String,
    #[serde(rename = "passwordHash")]
    pub password_hash: String,
    #[serde(rename = "profilePic", default)]
    pub profile_pic: Option<String>,
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    #[serde(default)]
    pub otp: Option<String>,
    #[serde(rename = "otpExpiry", default)]
    pub otp_expiry: Option<DateTime>,
}

impl UserDocument {
    /// Hex form of the document id, empty for a document not yet inserted.
    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }
}

/// Fields a profile update may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub profile_pic: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.bio.is_none() && self.profile_pic.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub otp: String,
}

/// Public view of an account. Never carries the password hash or OTP.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct UserOut {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub email: String,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "profilePic")]
    pub profile_pic: Option<String>,
}

impl From<&UserDocument> for UserOut {
    fn from(user: &UserDocument) -> Self {
        Self {
            id: user.id_hex(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            email: user.email.clone(),
            is_verified: user.is_verified,
            profile_pic: user.profile_pic.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    #[serde(flatten)]
    pub user: UserOut,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserOut,
}
