use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Liveness payload for `GET /health`.
pub mod health;

/// Feed posts, embedded comments and their public views.
pub mod post;

/// Student accounts, auth payloads and the public profile view.
pub mod user;

pub use health::HealthResponse;

/// Plain acknowledgement body, e.g. `{"message": "Post liked"}`.
#[derive(Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
