// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod notification;
pub mod otp;
pub mod post;
pub mod subscription;
pub mod user;

pub use notification::{NewNotification, Notification, NotificationPatch};
pub use otp::OtpRecord;
pub use post::{NewPost, Post, PostPatch};
pub use subscription::{PaymentRequest, Subscription};
pub use user::{NewUser, User, UserPatch};
