use crate::config::CloudinaryConfig;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;

/// Content types accepted for profile pictures and post images.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png"];

pub fn is_allowed_image_type(content_type: &str) -> bool {
    ALLOWED_IMAGE_TYPES.contains(&content_type)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("image host response has no secure_url")]
    MissingUrl,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores the image and returns its public HTTPS URL.
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError>;
}

#[derive(Deserialize)]
struct CloudinaryResponse {
    secure_url: Option<String>,
}

/// Unsigned uploads to Cloudinary through an upload preset.
pub struct CloudinaryHost {
    client: reqwest::Client,
    upload_url: String,
    upload_preset: String,
}

impl CloudinaryHost {
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self::with_url(config.upload_url(), config.upload_preset.clone())
    }

    pub fn with_url(upload_url: String, upload_preset: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            upload_url,
            upload_preset,
        }
    }
}

#[async_trait]
impl ImageHost for CloudinaryHost {
    async fn upload(&self, image: ImageUpload) -> Result<String, UploadError> {
        let part = Part::bytes(image.data)
            .file_name(image.file_name)
            .mime_str(&image.content_type)?;
        let form = Form::new()
            .text("upload_preset", self.upload_preset.clone())
            .part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!(event = "image_uploaded", status = %response.status(), "Image host accepted upload");

        let body: CloudinaryResponse = response.json().await?;
        body.secure_url.ok_or(UploadError::MissingUrl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_image_types() {
        assert!(is_allowed_image_type("image/jpeg"));
        assert!(is_allowed_image_type("image/png"));
        assert!(!is_allowed_image_type("image/gif"));
        assert!(!is_allowed_image_type("application/pdf"));
    }

    #[test]
    fn test_cloudinary_host_uses_configured_url() {
        let host = CloudinaryHost::new(&CloudinaryConfig {
            cloud_name: "demo".to_string(),
            upload_preset: "preset".to_string(),
        });
        assert_eq!(host.upload_url, "https://api.cloudinary.com/v1_1/demo/image/upload");
        assert_eq!(host.upload_preset, "preset");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_an_http_error() {
        let host = CloudinaryHost::with_url(
            "http://127.0.0.1:9/upload".to_string(),
            "preset".to_string(),
        );
        let result = host
            .upload(ImageUpload {
                file_name: "a.png".to_string(),
                content_type: "image/png".to_string(),
                data: vec![0x89, b'P', b'N', b'G'],
            })
            .await;
        assert!(matches!(result, Err(UploadError::Http(_))));
    }

    #[test]
    fn test_response_without_url() {
        let body: CloudinaryResponse = serde_json::from_str(r#"{"error": "x"}"#).unwrap();
        assert!(body.secure_url.is_none());
    }
}
