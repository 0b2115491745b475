//! User model and sparse-update patch.

use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
///
/// `isVerified` is deliberately an `Option`: only a stored literal
/// `false` blocks login, an absent flag passes. `favoritePosts` is an
/// ordered sequence of post ids; the store does not deduplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    /// Unique, case-sensitive as stored. Uniqueness is checked before
    /// insert, not by an index.
    pub email: String,
    /// Plaintext. Known weakness, kept for wire compatibility with the
    /// existing frontend.
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    /// Blob reference into the upload directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_post: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_success: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_banned: Option<bool>,
    /// Absent until the first favorite is added.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_posts: Option<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// Registration payload (the `data` object of `POST /register`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub is_verified: Option<bool>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub account_type: Option<String>,
    pub is_admin: Option<bool>,
}

impl NewUser {
    /// Materialize a storable user, stamping both timestamps with `now`.
    pub fn into_user(self, now: String) -> User {
        User {
            id: ObjectId::new(),
            name: self.name,
            email: self.email,
            password: self.password,
            phone: self.phone,
            is_verified: self.is_verified,
            image: self.image,
            location: self.location,
            total_post: Some(0),
            rent_success: Some(0),
            is_admin: self.is_admin,
            account_type: self.account_type,
            subscription_status: None,
            subscription_id: None,
            expires_in: None,
            payment_method: None,
            is_banned: None,
            favorite_posts: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Sparse update for `PUT /update-user/{id}`.
///
/// One rule everywhere: a field is written iff it is present and
/// non-null in the request. Absent and JSON-null both leave the stored
/// value untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub is_verified: Option<bool>,
    pub image: Option<String>,
    pub location: Option<String>,
    pub total_post: Option<i32>,
    pub rent_success: Option<i32>,
    pub is_admin: Option<bool>,
    pub account_type: Option<String>,
    pub subscription_status: Option<String>,
    pub subscription_id: Option<String>,
    pub expires_in: Option<String>,
    pub payment_method: Option<String>,
    pub is_banned: Option<bool>,
}

impl UserPatch {
    /// Build the `$set` document. Only supplied fields are written;
    /// `updatedAt` is always refreshed.
    pub fn into_set_document(self, updated_at: String) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.name {
            set.insert("name", v);
        }
        if let Some(v) = self.email {
            set.insert("email", v);
        }
        if let Some(v) = self.password {
            set.insert("password", v);
        }
        if let Some(v) = self.phone {
            set.insert("phone", v);
        }
        if let Some(v) = self.is_verified {
            set.insert("isVerified", v);
        }
        if let Some(v) = self.image {
            set.insert("image", v);
        }
        if let Some(v) = self.location {
            set.insert("location", v);
        }
        if let Some(v) = self.total_post {
            set.insert("totalPost", v);
        }
        if let Some(v) = self.rent_success {
            set.insert("rentSuccess", v);
        }
        if let Some(v) = self.is_admin {
            set.insert("isAdmin", v);
        }
        if let Some(v) = self.account_type {
            set.insert("accountType", v);
        }
        if let Some(v) = self.subscription_status {
            set.insert("subscriptionStatus", v);
        }
        if let Some(v) = self.subscription_id {
            set.insert("subscriptionId", v);
        }
        if let Some(v) = self.expires_in {
            set.insert("expiresIn", v);
        }
        if let Some(v) = self.payment_method {
            set.insert("paymentMethod", v);
        }
        if let Some(v) = self.is_banned {
            set.insert("isBanned", v);
        }
        set.insert("updatedAt", updated_at);
        set
    }
}
