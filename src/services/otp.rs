//! OTP issuance and verification.
//!
//! Issuance persists the code before attempting delivery: a failed email
//! still leaves a verifiable record behind. Verification compares
//! against the newest record only; older codes stay in the store and a
//! code can be replayed until a newer one is issued.

use rand::Rng;

use crate::db::MarketDb;
use crate::error::{AppError, Result};
use crate::models::OtpRecord;
use crate::services::Mailer;
use crate::time_utils::now_rfc3339;

/// Generate a 4-digit decimal code, uniform over 1000-9999.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    rng.random_range(1000..=9999).to_string()
}

/// Issue a fresh code for `email`: persist first, then dispatch.
pub async fn issue(db: &MarketDb, mailer: &Mailer, email: &str) -> Result<()> {
    let code = generate_code();

    let record = OtpRecord {
        email: email.to_string(),
        otp: code.clone(),
        timestamp: now_rfc3339(),
    };
    db.insert_otp(&record).await?;

    // Delivery failure surfaces as its own error, after the write.
    mailer.send_otp(email, &code)?;

    tracing::debug!(email, "OTP issued");
    Ok(())
}

/// Check `candidate` against the latest code issued for `email`.
pub async fn verify(db: &MarketDb, email: &str, candidate: &str) -> Result<()> {
    let latest = db.latest_otp(email).await?.ok_or_else(|| {
        AppError::NotFound("No OTP found for the provided email".to_string())
    })?;

    if candidate == latest.otp {
        Ok(())
    } else {
        Err(AppError::InvalidOtp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_four_digits_in_range() {
        for _ in 0..1000 {
            let code = generate_code();
            assert_eq!(code.len(), 4);
            let n: u32 = code.parse().expect("numeric");
            assert!((1000..=9999).contains(&n));
        }
    }

    #[test]
    fn generated_codes_vary() {
        let first = generate_code();
        let mut saw_different = false;
        for _ in 0..100 {
            if generate_code() != first {
                saw_different = true;
                break;
            }
        }
        assert!(saw_different, "100 draws should not all collide");
    }
}
