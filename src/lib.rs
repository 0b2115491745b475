// SPDX-License-Identifier: MIT

//! Rentnest: REST backend for a rental/classifieds marketplace.
//!
//! This crate provides user registration with OTP email verification,
//! token-authenticated listing CRUD with moderation, favorites,
//! directional notifications, and a payment ledger that promotes
//! listings to ads.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::MarketDb;
use middleware::auth::RevocationList;
use services::Mailer;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: MarketDb,
    pub mailer: Mailer,
    pub revoked: RevocationList,
}
