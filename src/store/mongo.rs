use super::{PostStore, StoreError, UserStore};
use crate::models::post::{Comment, PostDocument};
use crate::models::user::{ProfileUpdate, UserDocument};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Collection, Database, IndexModel};

const DUPLICATE_KEY_CODE: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY_CODE
    )
}

#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<UserDocument>,
}

impl MongoUserStore {
    pub const COLLECTION: &'static str = "users_v2";

    pub fn new(db: &Database) -> Self {
        Self {
            users: db.collection(Self::COLLECTION),
        }
    }

    /// Creates the unique index on `email` if it does not exist yet.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(index).await?;
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<UserDocument>, StoreError> {
        Ok(self.users.find_one(doc! { "_id": *id }).await?)
    }

    async fn insert(&self, mut user: UserDocument) -> Result<ObjectId, StoreError> {
        let id = *user.id.get_or_insert_with(ObjectId::new);
        match self.users.insert_one(&user).await {
            Ok(_) => Ok(id),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Duplicate),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_verified(&self, email: &str) -> Result<(), StoreError> {
        self.users
            .update_one(
                doc! { "email": email },
                doc! { "$set": { "isVerified": true, "otp": null, "otpExpiry": null } },
            )
            .await?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: &ObjectId,
        update: ProfileUpdate,
    ) -> Result<(), StoreError> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(bio) = update.bio {
            set.insert("bio", bio);
        }
        if let Some(pic) = update.profile_pic {
            set.insert("profilePic", pic);
        }
        if set.is_empty() {
            return Ok(());
        }

        self.users
            .update_one(doc! { "_id": *id }, doc! { "$set": set })
            .await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct MongoPostStore {
    posts: Collection<PostDocument>,
}

impl MongoPostStore {
    pub const COLLECTION: &'static str = "posts";

    pub fn new(db: &Database) -> Self {
        Self {
            posts: db.collection(Self::COLLECTION),
        }
    }
}

#[async_trait]
impl PostStore for MongoPostStore {
    async fn insert(&self, mut post: PostDocument) -> Result<ObjectId, StoreError> {
        let id = *post.id.get_or_insert_with(ObjectId::new);
        self.posts.insert_one(&post).await?;
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<PostDocument>, StoreError> {
        Ok(self.posts.find_one(doc! { "_id": *id }).await?)
    }

    async fn list_recent(&self) -> Result<Vec<PostDocument>, StoreError> {
        let cursor = self
            .posts
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError> {
        self.posts
            .update_one(doc! { "_id": *id }, doc! { "$addToSet": { "likes": user_id } })
            .await?;
        Ok(())
    }

    async fn remove_like(&self, id: &ObjectId, user_id: &str) -> Result<(), StoreError> {
        self.posts
            .update_one(doc! { "_id": *id }, doc! { "$pull": { "likes": user_id } })
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<(), StoreError> {
        self.posts.delete_one(doc! { "_id": *id }).await?;
        Ok(())
    }

    async fn push_comment(&self, id: &ObjectId, comment: Comment) -> Result<bool, StoreError> {
        let comment = bson::to_bson(&comment)?;
        let result = self
            .posts
            .update_one(doc! { "_id": *id }, doc! { "$push": { "comments": comment } })
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn replace_comments(
        &self,
        id: &ObjectId,
        comments: Vec<Comment>,
    ) -> Result<(), StoreError> {
        let comments = bson::to_bson(&comments)?;
        self.posts
            .update_one(doc! { "_id": *id }, doc! { "$set": { "comments": comments } })
            .await?;
        Ok(())
    }
}
