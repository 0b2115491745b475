//! Listing (post) model and sparse-update patch.

use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Property listing stored in the `posts` collection.
///
/// `userId` is a plain string, not an ObjectId - owner lookups compare
/// it verbatim. A post is invisible in the approved view until a
/// moderator flips `isApproved`; `isAds` flips via the payment ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_negotiable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bed_room: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bath_room: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kitchen: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drawing_room: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dining_room: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balcony: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_message: Option<String>,
    pub like_count: i32,
    pub is_public_number: bool,
    pub is_sold: bool,
    pub is_approved: bool,
    pub is_admin_post: bool,
    pub is_ads: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Listing submission payload (the `data` object of `POST /create-post`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub is_negotiable: Option<bool>,
    pub bed_room: Option<i32>,
    pub bath_room: Option<i32>,
    pub kitchen: Option<i32>,
    pub drawing_room: Option<i32>,
    pub dining_room: Option<i32>,
    pub balcony: Option<i32>,
    pub bills: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub additional_message: Option<String>,
    pub is_public_number: Option<bool>,
    pub is_admin_post: Option<bool>,
}

impl NewPost {
    /// Materialize a storable post owned by `user_id`.
    ///
    /// Moderation state always starts unapproved; ad state always starts
    /// off. Neither can be set at submission time.
    pub fn into_post(self, user_id: String, now: String) -> Post {
        Post {
            id: ObjectId::new(),
            user_id,
            location: self.location,
            property_type: self.property_type,
            is_negotiable: self.is_negotiable,
            bed_room: self.bed_room,
            bath_room: self.bath_room,
            kitchen: self.kitchen,
            drawing_room: self.drawing_room,
            dining_room: self.dining_room,
            balcony: self.balcony,
            bills: self.bills,
            image: self.image,
            price: self.price,
            additional_message: self.additional_message,
            like_count: 0,
            is_public_number: self.is_public_number.unwrap_or(false),
            is_sold: false,
            is_approved: false,
            is_admin_post: self.is_admin_post.unwrap_or(false),
            is_ads: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Sparse update for `PUT /update-post/{id}`. Same present-and-non-null
/// rule as [`super::UserPatch`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub location: Option<String>,
    #[serde(rename = "type")]
    pub property_type: Option<String>,
    pub is_negotiable: Option<bool>,
    pub bed_room: Option<i32>,
    pub bath_room: Option<i32>,
    pub kitchen: Option<i32>,
    pub drawing_room: Option<i32>,
    pub dining_room: Option<i32>,
    pub balcony: Option<i32>,
    pub bills: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub additional_message: Option<String>,
    pub like_count: Option<i32>,
    pub is_public_number: Option<bool>,
    pub is_sold: Option<bool>,
    pub is_approved: Option<bool>,
    pub is_admin_post: Option<bool>,
}

impl PostPatch {
    pub fn into_set_document(self, updated_at: String) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.location {
            set.insert("location", v);
        }
        if let Some(v) = self.property_type {
            set.insert("type", v);
        }
        if let Some(v) = self.is_negotiable {
            set.insert("isNegotiable", v);
        }
        if let Some(v) = self.bed_room {
            set.insert("bedRoom", v);
        }
        if let Some(v) = self.bath_room {
            set.insert("bathRoom", v);
        }
        if let Some(v) = self.kitchen {
            set.insert("kitchen", v);
        }
        if let Some(v) = self.drawing_room {
            set.insert("drawingRoom", v);
        }
        if let Some(v) = self.dining_room {
            set.insert("diningRoom", v);
        }
        if let Some(v) = self.balcony {
            set.insert("balcony", v);
        }
        if let Some(v) = self.bills {
            set.insert("bills", v);
        }
        if let Some(v) = self.image {
            set.insert("image", v);
        }
        if let Some(v) = self.price {
            set.insert("price", v);
        }
        if let Some(v) = self.additional_message {
            set.insert("additionalMessage", v);
        }
        if let Some(v) = self.like_count {
            set.insert("likeCount", v);
        }
        if let Some(v) = self.is_public_number {
            set.insert("isPublicNumber", v);
        }
        if let Some(v) = self.is_sold {
            set.insert("isSold", v);
        }
        if let Some(v) = self.is_approved {
            set.insert("isApproved", v);
        }
        if let Some(v) = self.is_admin_post {
            set.insert("isAdminPost", v);
        }
        set.insert("updatedAt", updated_at);
        set
    }
}
