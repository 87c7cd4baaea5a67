use chrono::{SecondsFormat, Utc};
use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored comment, embedded in its post and addressed by position.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    pub created_at: DateTime,
}

/// Stored shape of a feed post in the `posts` collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "user_profilePic", default)]
    pub user_profile_pic: Option<String>,
    pub content: String,
    #[serde(default)]
    pub image: Option<String>,
    pub created_at: DateTime,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub likes: Vec<String>,
}

impl PostDocument {
    pub fn is_liked_by(&self, user_id: &str) -> bool {
        self.likes.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CommentRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct CommentOut {
    pub user_id: String,
    pub user_name: String,
    pub text: String,
    /// RFC 3339, UTC
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PostOut {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    #[serde(rename = "user_profilePic")]
    pub user_profile_pic: Option<String>,
    pub content: String,
    pub image: Option<String>,
    /// RFC 3339, UTC
    pub created_at: String,
    pub comments: Vec<CommentOut>,
    pub likes: Vec<String>,
    pub like_count: usize,
}

fn to_rfc3339(at: DateTime) -> String {
    chrono::DateTime::<Utc>::from_timestamp_millis(at.timestamp_millis())
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl From<&Comment> for CommentOut {
    fn from(comment: &Comment) -> Self {
        Self {
            user_id: comment.user_id.clone(),
            user_name: comment.user_name.clone(),
            text: comment.text.clone(),
            created_at: to_rfc3339(comment.created_at),
        }
    }
}

impl From<&PostDocument> for PostOut {
    fn from(post: &PostDocument) -> Self {
        Self {
            id: post.id.map(|id| id.to_hex()).unwrap_or_default(),
            user_id: post.user_id.clone(),
            user_name: post.user_name.clone(),
            user_profile_pic: post.user_profile_pic.clone(),
            content: post.content.clone(),
            image: post.image.clone(),
            created_at: to_rfc3339(post.created_at),
            comments: post.comments.iter().map(CommentOut::from).collect(),
            likes: post.likes.clone(),
            like_count: post.likes.len(),
        }
    }
}
