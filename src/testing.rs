//! Shared fixtures for the HTTP route tests.

use crate::auth::issue_token;
use crate::config::AuthConfig;
use crate::mail::{Mailer, MockMailer};
use crate::media::{ImageHost, MockImageHost};
use crate::models::user::UserDocument;
use crate::store::memory::{MemoryPostStore, MemoryUserStore};
use crate::store::{PostStore, UserStore};
use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use jsonwebtoken::Algorithm;
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

pub const UPLOADED_URL: &str = "https://res.cloudinary.com/demo/image/upload/v1/pic.png";
pub const BOUNDARY: &str = "----studenthub-test-boundary";

pub fn auth_settings() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-key-for-testing".to_string(),
        jwt_algorithm: Algorithm::HS256,
        otp_ttl_minutes: 10,
        bcrypt_cost: 4,
    }
}

/// Mailer that accepts every message.
pub fn accepting_mailer() -> MockMailer {
    let mut mailer = MockMailer::new();
    mailer.expect_send().returning(|_| Ok(()));
    mailer
}

/// Image host that answers every upload with [`UPLOADED_URL`].
pub fn accepting_image_host() -> MockImageHost {
    let mut host = MockImageHost::new();
    host.expect_upload()
        .returning(|_| Ok(UPLOADED_URL.to_string()));
    host
}

pub struct TestContext {
    pub users: Arc<MemoryUserStore>,
    pub posts: Arc<MemoryPostStore>,
    pub settings: AuthConfig,
    mailer: Arc<dyn Mailer>,
    images: Arc<dyn ImageHost>,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            users: Arc::new(MemoryUserStore::default()),
            posts: Arc::new(MemoryPostStore::default()),
            settings: auth_settings(),
            mailer: Arc::new(accepting_mailer()),
            images: Arc::new(accepting_image_host()),
        }
    }

    pub fn with_mailer(mut self, mailer: MockMailer) -> Self {
        self.mailer = Arc::new(mailer);
        self
    }

    pub fn with_image_host(mut self, images: MockImageHost) -> Self {
        self.images = Arc::new(images);
        self
    }

    pub async fn init_app(
        &self,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = ServiceResponse,
        Error = actix_web::Error,
    > {
        let users: Arc<dyn UserStore> = self.users.clone();
        let posts: Arc<dyn PostStore> = self.posts.clone();

        test::init_service(
            App::new()
                .app_data(web::Data::new(self.settings.clone()))
                .app_data(web::Data::from(users))
                .app_data(web::Data::from(posts))
                .app_data(web::Data::from(self.mailer.clone()))
                .app_data(web::Data::from(self.images.clone()))
                .configure(crate::routes::configure),
        )
        .await
    }

    /// Inserts an account directly and returns it with a valid bearer token.
    pub async fn seed_user(&self, name: &str, email: &str, password: &str, verified: bool) -> (UserDocument, String) {
        let mut user = UserDocument {
            id: Some(ObjectId::new()),
            name: name.to_string(),
            bio: String::new(),
            email: email.to_string(),
            password_hash: bcrypt::hash(password, self.settings.bcrypt_cost).unwrap(),
            profile_pic: None,
            is_verified: verified,
            otp: None,
            otp_expiry: None,
        };
        user.id = Some(self.users.insert(user.clone()).await.unwrap());
        let token = issue_token(email, &self.settings).unwrap();
        (user, format!("Bearer {}", token))
    }
}

/// A part of a multipart/form-data body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        data: &'a [u8],
    },
}

/// Encodes `parts` as a multipart body; returns the content-type header
/// value and the payload.
pub fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\nContent-Type: text/plain\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
