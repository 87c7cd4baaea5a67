//! In-process stores backing the route tests.

use super::{PostStore, StoreError, UserStore};
use crate::models::post::{Comment, PostDocument};
use crate::models::user::{ProfileUpdate, UserDocument};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<UserDocument>>,
}

impl MemoryUserStore {
    pub fn snapshot(&self, email: &str) -> Option<UserDocument> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn with_user<F: FnOnce(&mut UserDocument)>(&self, email: &str, f: F) {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.email == email) {
            f(user);
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.snapshot(email))
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<UserDocument>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id.as_ref() == Some(id))
            .cloned())
    }

    async fn insert(&self, mut user: UserDocument) -> Result<ObjectId, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate);
        }
        let id = *user.id.get_or_insert_with(ObjectId::new);
        users.push(user);
        Ok(id)
    }

    async fn mark_verified(&self, email: &str) -> Result<(), StoreError> {
        self.with_user(email, |u| {
            u.is_verified = true;
            u.otp = None;
            u.otp_expiry = None;
        });
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id.as_ref() == Some(id)) {
            if let Some(name) = update.name {
                user.name = name;
            }
            if let Some(bio) = update.bio {
                user.bio = bio;
            }
            if let Some(pic) = update.profile_pic {
                user.profile_pic = Some(pic);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<Vec<PostDocument>>,
}

impl MemoryPostStore {
    pub fn get(&self, id: &ObjectId) -> Option<PostDocument> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id.as_ref() == Some(id))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn update<F: FnOnce(&mut PostDocument)>(&self, id: &ObjectId, f: F) -> bool {
        let mut posts = self.posts.lock().unwrap();
        match posts.iter_mut().find(|p| p.id.as_ref() == Some(id)) {
            Some(post) => {
                f(post);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, mut post: PostDocument) -> Result<ObjectId, StoreError> {
        let id = *post.id.get_or_insert_with(ObjectId::new);
        self.posts.lock().unwrap().push(post);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PostDocument>, StoreError> {
        Ok(self.get(id))
    }

    async fn list_recent(&self) -> Result<Vec<PostDocument>, StoreError> {
        let mut posts = self.posts.lock().unwrap().clone();
        posts.sort_by_key(|p| std::cmp::Reverse(p.created_at.timestamp_millis()));
        Ok(posts)
    }

    async fn add_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError> {
        self.update(id, |p| {
            if !p.is_liked_by(user_id) {
                p.likes.push(user_id.to_string());
            }
        });
        Ok(())
    }

    async fn remove_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError> {
        self.update(id, |p| p.likes.retain(|l| l != user_id));
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.posts
            .lock()
            .unwrap()
            .retain(|p| p.id.as_ref() != Some(id));
        Ok(())
    }

    async fn push_comment(&self, id: &ObjectId, comment: Comment) -> Result<bool, StoreError> {
        Ok(self.update(id, |p| p.comments.push(comment)))
    }

    async fn replace_comments(
        &self,
        id: &ObjectId,
        comments: Vec<Comment>,
    ) -> Result<(), StoreError> {
        self.update(id, |p| p.comments = comments);
        Ok(())
    }
}
