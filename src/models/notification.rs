//! Notification model with two-phase delivery visibility.

use mongodb::bson::{oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

/// Sentinel marking the `senderFrom` tag as active for the sender side.
pub const SENDER_ACTIVE: &str = "sender";
/// Sentinel marking the `senderTo` tag as active for the receiver side.
pub const RECEIVER_ACTIVE: &str = "receiver";

/// Directional message between two parties about a listing.
///
/// Visibility is gated by the sender-role tags, not by the from/to ids:
/// `listTo` only returns records with `senderTo == "receiver"`, and
/// `listFrom` only returns records with `senderFrom == "sender"`.
/// Toggling a tag is how the counterpart claims or releases visibility;
/// the UI depends on this two-phase rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub from: String,
    pub to: String,
    pub post_id: String,
    pub sender_from: String,
    pub sender_to: String,
    pub status: String,
    pub owner_read: bool,
    pub user_read: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Creation payload for `POST /create-notification`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNotification {
    pub from: String,
    pub to: String,
    pub post_id: String,
    pub sender_from: Option<String>,
    pub sender_to: Option<String>,
    pub status: Option<String>,
}

impl NewNotification {
    pub fn into_notification(self, now: String) -> Notification {
        Notification {
            id: ObjectId::new(),
            from: self.from,
            to: self.to,
            post_id: self.post_id,
            sender_from: self.sender_from.unwrap_or_else(|| SENDER_ACTIVE.to_string()),
            sender_to: self
                .sender_to
                .unwrap_or_else(|| RECEIVER_ACTIVE.to_string()),
            status: self.status.unwrap_or_else(|| "pending".to_string()),
            owner_read: false,
            user_read: false,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Sparse update for `PATCH /update-notification/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    pub status: Option<String>,
    pub owner_read: Option<bool>,
    pub user_read: Option<bool>,
    pub sender_from: Option<String>,
    pub sender_to: Option<String>,
}

impl NotificationPatch {
    pub fn into_set_document(self, updated_at: String) -> Document {
        let mut set = Document::new();
        if let Some(v) = self.status {
            set.insert("status", v);
        }
        if let Some(v) = self.owner_read {
            set.insert("ownerRead", v);
        }
        if let Some(v) = self.user_read {
            set.insert("userRead", v);
        }
        if let Some(v) = self.sender_from {
            set.insert("senderFrom", v);
        }
        if let Some(v) = self.sender_to {
            set.insert("senderTo", v);
        }
        set.insert("updatedAt", updated_at);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_notification_defaults_to_deliverable_tags() {
        let n = NewNotification {
            from: "a".into(),
            to: "b".into(),
            post_id: "p".into(),
            sender_from: None,
            sender_to: None,
            status: None,
        }
        .into_notification("t0".to_string());

        assert_eq!(n.sender_from, SENDER_ACTIVE);
        assert_eq!(n.sender_to, RECEIVER_ACTIVE);
        assert!(!n.owner_read);
        assert!(!n.user_read);
    }

    #[test]
    fn patch_can_release_receiver_visibility() {
        let patch = NotificationPatch {
            sender_to: Some("claimed".to_string()),
            ..Default::default()
        };
        let set = patch.into_set_document("now".to_string());
        assert_eq!(set.get_str("senderTo").unwrap(), "claimed");
        assert_eq!(set.len(), 2);
    }
}
