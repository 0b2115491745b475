//! Database layer (MongoDB).

pub mod mongo;

pub use mongo::MarketDb;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const OTP: &str = "otp";
    pub const POSTS: &str = "posts";
    pub const NOTIFICATIONS: &str = "notifications";
    /// Payment ledger (one document per checkout session)
    pub const SUBSCRIPTIONS: &str = "subscriptions";
}
