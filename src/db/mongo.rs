// SPDX-License-Identifier: MIT

//! MongoDB client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profiles, favorites membership)
//! - OTP records (append-only verification codes)
//! - Posts (listings with moderation and ad flags)
//! - Notifications (directional messages)
//! - Subscriptions (payment ledger)
//!
//! All mutations are single-document; there are no multi-document
//! transactions. Favorites use the store's atomic `$push`/`$pull`
//! primitives so concurrent favoriting cannot lose updates.

use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::{ClientOptions, FindOneOptions};
use mongodb::{Client, Collection, Database};

use crate::db::collections;
use crate::error::AppError;
use crate::models::notification::{RECEIVER_ACTIVE, SENDER_ACTIVE};
use crate::models::{Notification, OtpRecord, Post, Subscription, User};
use crate::time_utils::now_rfc3339;

/// Filter for a user's inbox: records addressed to them AND tagged
/// deliverable on the receiver side.
pub fn inbox_filter(user_id: &str) -> Document {
    doc! { "to": user_id, "senderTo": RECEIVER_ACTIVE }
}

/// Filter for a user's outbox: records from them AND tagged active on
/// the sender side.
pub fn outbox_filter(user_id: &str) -> Document {
    doc! { "from": user_id, "senderFrom": SENDER_ACTIVE }
}

/// Filter for the "nearest" view: case-insensitive substring match on
/// location, intersected with the approved view.
pub fn nearest_filter(location: &str) -> Document {
    doc! {
        "location": { "$regex": location, "$options": "i" },
        "isApproved": true,
    }
}

/// MongoDB database client.
#[derive(Clone)]
pub struct MarketDb {
    db: Option<Database>,
}

impl MarketDb {
    /// Connect to MongoDB and select the application database.
    pub async fn new(uri: &str, database: &str) -> Result<Self, AppError> {
        let mut options = ClientOptions::parse(uri)
            .await
            .map_err(|e| AppError::Database(format!("Failed to parse MongoDB URI: {}", e)))?;
        options.app_name = Some("rentnest".to_string());

        let client = Client::with_options(options)
            .map_err(|e| AppError::Database(format!("Failed to connect to MongoDB: {}", e)))?;

        tracing::info!(database, "Connected to MongoDB");

        Ok(Self {
            db: Some(client.database(database)),
        })
    }

    /// Create a mock client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { db: None }
    }

    /// Helper to get the database or return an error if offline.
    fn get_db(&self) -> Result<&Database, AppError> {
        self.db
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    fn users(&self) -> Result<Collection<User>, AppError> {
        Ok(self.get_db()?.collection(collections::USERS))
    }

    fn otps(&self) -> Result<Collection<OtpRecord>, AppError> {
        Ok(self.get_db()?.collection(collections::OTP))
    }

    fn posts(&self) -> Result<Collection<Post>, AppError> {
        Ok(self.get_db()?.collection(collections::POSTS))
    }

    fn notifications(&self) -> Result<Collection<Notification>, AppError> {
        Ok(self.get_db()?.collection(collections::NOTIFICATIONS))
    }

    fn subscriptions(&self) -> Result<Collection<Subscription>, AppError> {
        Ok(self.get_db()?.collection(collections::SUBSCRIPTIONS))
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users()?
            .insert_one(user, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        self.users()?
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Exact (email, password) pair lookup used by login.
    pub async fn find_user_by_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        self.users()?
            .find_one(doc! { "email": email, "password": password }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn get_user(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        self.users()?
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.users()?
            .find(doc! {}, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply a pre-built `$set` document. Returns false when the id did
    /// not match an existing user.
    pub async fn update_user(&self, id: &ObjectId, set: Document) -> Result<bool, AppError> {
        let result = self
            .users()?
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_user(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .users()?
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }

    // ─── Favorites Operations ────────────────────────────────────

    /// Append a post id to the user's favorites sequence. Duplicates are
    /// allowed; `$push` creates the array on first use. Returns false
    /// when the user does not exist.
    pub async fn push_favorite(&self, id: &ObjectId, post_id: &str) -> Result<bool, AppError> {
        let result = self
            .users()?
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$push": { "favoritePosts": post_id },
                    "$set": { "updatedAt": now_rfc3339() },
                },
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    /// Remove ALL occurrences of a post id from the user's favorites.
    pub async fn pull_favorite(&self, id: &ObjectId, post_id: &str) -> Result<bool, AppError> {
        let result = self
            .users()?
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$pull": { "favoritePosts": post_id },
                    "$set": { "updatedAt": now_rfc3339() },
                },
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    // ─── OTP Operations ──────────────────────────────────────────

    /// Append an OTP record. The collection is never updated or pruned.
    pub async fn insert_otp(&self, record: &OtpRecord) -> Result<(), AppError> {
        self.otps()?
            .insert_one(record, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// The current code for an email: maximum timestamp wins. Older
    /// records stay behind it and are never consulted.
    pub async fn latest_otp(&self, email: &str) -> Result<Option<OtpRecord>, AppError> {
        let options = FindOneOptions::builder()
            .sort(doc! { "timestamp": -1 })
            .build();
        self.otps()?
            .find_one(doc! { "email": email }, options)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn insert_post(&self, post: &Post) -> Result<(), AppError> {
        self.posts()?
            .insert_one(post, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn get_post(&self, id: &ObjectId) -> Result<Option<Post>, AppError> {
        self.posts()?
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, AppError> {
        self.find_posts(doc! {}).await
    }

    pub async fn list_approved_posts(&self) -> Result<Vec<Post>, AppError> {
        self.find_posts(doc! { "isApproved": true }).await
    }

    pub async fn list_pending_posts(&self) -> Result<Vec<Post>, AppError> {
        self.find_posts(doc! { "isApproved": false }).await
    }

    pub async fn nearest_posts(&self, location: &str) -> Result<Vec<Post>, AppError> {
        self.find_posts(nearest_filter(location)).await
    }

    /// All posts owned by the given user id, compared as a plain string.
    pub async fn posts_by_owner(&self, user_id: &str) -> Result<Vec<Post>, AppError> {
        self.find_posts(doc! { "userId": user_id }).await
    }

    async fn find_posts(&self, filter: Document) -> Result<Vec<Post>, AppError> {
        self.posts()?
            .find(filter, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update_post(&self, id: &ObjectId, set: Document) -> Result<bool, AppError> {
        let result = self
            .posts()?
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_post(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .posts()?
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }

    /// Promote a post to ad status. Unconditional: a post already
    /// promoted stays promoted.
    pub async fn set_post_ads(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .posts()?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "isAds": true, "updatedAt": now_rfc3339() } },
                None,
            )
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    // ─── Notification Operations ─────────────────────────────────

    pub async fn insert_notification(&self, n: &Notification) -> Result<(), AppError> {
        self.notifications()?
            .insert_one(n, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn get_notification(&self, id: &ObjectId) -> Result<Option<Notification>, AppError> {
        self.notifications()?
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Records delivered to `user_id`: the receiver-side tag must still
    /// hold its sentinel, a matching `to` alone is not enough.
    pub async fn notifications_to(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        self.find_notifications(inbox_filter(user_id)).await
    }

    pub async fn notifications_from(&self, user_id: &str) -> Result<Vec<Notification>, AppError> {
        self.find_notifications(outbox_filter(user_id)).await
    }

    pub async fn notifications_by_post(&self, post_id: &str) -> Result<Vec<Notification>, AppError> {
        self.find_notifications(doc! { "postId": post_id }).await
    }

    pub async fn list_notifications(&self) -> Result<Vec<Notification>, AppError> {
        self.find_notifications(doc! {}).await
    }

    async fn find_notifications(&self, filter: Document) -> Result<Vec<Notification>, AppError> {
        self.notifications()?
            .find(filter, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn update_notification(&self, id: &ObjectId, set: Document) -> Result<bool, AppError> {
        let result = self
            .notifications()?
            .update_one(doc! { "_id": id }, doc! { "$set": set }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.matched_count > 0)
    }

    pub async fn delete_notification(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self
            .notifications()?
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.deleted_count > 0)
    }

    // ─── Subscription Operations ─────────────────────────────────

    pub async fn find_subscription_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Subscription>, AppError> {
        self.subscriptions()?
            .find_one(doc! { "sessionId": session_id }, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn insert_subscription(&self, sub: &Subscription) -> Result<(), AppError> {
        self.subscriptions()?
            .insert_one(sub, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    pub async fn list_subscriptions(&self) -> Result<Vec<Subscription>, AppError> {
        self.subscriptions()?
            .find(doc! {}, None)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
