//! Persistence for accounts and feed posts.
//!
//! Handlers only see the [`UserStore`] and [`PostStore`] traits; the MongoDB
//! implementations live in [`mongo`].

use crate::models::post::{Comment, PostDocument};
use crate::models::user::{ProfileUpdate, UserDocument};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

pub mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::{MongoPostStore, MongoUserStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("document encoding error: {0}")]
    Encoding(#[from] mongodb::bson::ser::Error),

    #[error("duplicate key")]
    Duplicate,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<UserDocument>, StoreError>;

    /// Inserts a new account and returns its id. Fails with
    /// [`StoreError::Duplicate`] when the e-mail is already taken.
    async fn insert(&self, user: UserDocument) -> Result<ObjectId, StoreError>;

    /// Marks the account verified and clears its OTP.
    async fn mark_verified(&self, email: &str) -> Result<(), StoreError>;

    async fn update_profile(&self, id: &ObjectId, update: ProfileUpdate)
    -> Result<(), StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, post: PostDocument) -> Result<ObjectId, StoreError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PostDocument>, StoreError>;

    /// All posts, newest first.
    async fn list_recent(&self) -> Result<Vec<PostDocument>, StoreError>;

    /// Adds `user_id` to the like set. Adding twice is a no-op.
    async fn add_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError>;

    async fn remove_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError>;

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError>;

    /// Appends a comment. Returns `false` when no post has this id.
    async fn push_comment(&self, id: &ObjectId, comment: Comment) -> Result<bool, StoreError>;

    async fn replace_comments(
        &self,
        id: &ObjectId,
        comments: Vec<Comment>,
    ) -> Result<(), StoreError>;
}
