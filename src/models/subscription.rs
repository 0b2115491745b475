//! Payment/subscription ledger model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One recorded payment session. Append-only; `sessionId` is unique at
/// the application level and a replay is rejected with Conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub session_id: String,
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub created_at: String,
}

/// Payment submission for `POST /make-payment`. Echoed back to the
/// caller as submitted on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub session_id: String,
    pub post_id: String,
    pub amount: Option<f64>,
    pub method: Option<String>,
}

impl PaymentRequest {
    pub fn into_subscription(self, now: String) -> Subscription {
        Subscription {
            id: ObjectId::new(),
            session_id: self.session_id,
            post_id: self.post_id,
            amount: self.amount,
            method: self.method,
            created_at: now,
        }
    }
}
