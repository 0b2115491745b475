// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod mailer;
pub mod otp;

pub use mailer::Mailer;
