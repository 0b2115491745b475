//! OTP record model.

use serde::{Deserialize, Serialize};

/// One issued verification code.
///
/// The `otp` collection is append-only: records are never updated or
/// deleted, and the "current" code for an email is the one with the
/// maximum timestamp. There is no expiry window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpRecord {
    pub email: String,
    /// 4-digit decimal string, 1000-9999
    pub otp: String,
    pub timestamp: String,
}
