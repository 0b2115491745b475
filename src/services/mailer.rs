//! OTP email delivery over SMTP.

use crate::error::AppError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::{Message, SmtpTransport, Transport};

/// SMTP mailer for verification codes.
///
/// Without an SMTP URL the mailer runs in offline mode: the code is
/// logged instead of delivered, which keeps local development and tests
/// working without a mail account.
pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: Mailbox,
}

impl Mailer {
    pub fn new(smtp_url: Option<&str>, from: &str) -> anyhow::Result<Self> {
        let transport = match smtp_url {
            Some(url) => Some(SmtpTransport::from_url(url)?.build()),
            None => None,
        };

        Ok(Self {
            transport,
            from: from.parse()?,
        })
    }

    /// Create a mailer for testing (offline mode).
    pub fn new_mock() -> Self {
        Self {
            transport: None,
            from: "Rentnest <noreply@rentnest.test>"
                .parse()
                .expect("static mailbox"),
        }
    }

    /// Send a verification code. Delivery failure is reported to the
    /// caller; the already-persisted OTP record is not rolled back.
    pub fn send_otp(&self, to: &str, code: &str) -> Result<(), AppError> {
        let Some(transport) = &self.transport else {
            tracing::info!(to, "SMTP not configured; OTP logged instead of sent");
            tracing::debug!(code, "OTP code");
            return Ok(());
        };

        let email = Message::builder()
            .from(self.from.clone())
            .to(to
                .parse()
                .map_err(|e| AppError::Delivery(format!("invalid recipient: {}", e)))?)
            .subject("OTP Verification Code")
            .header(ContentType::TEXT_PLAIN)
            .body(format!("Your OTP verification code is: {}", code))
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        transport
            .send(&email)
            .map_err(|e| AppError::Delivery(e.to_string()))?;

        Ok(())
    }
}
