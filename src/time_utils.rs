// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{SecondsFormat, Utc};

/// Current UTC time as RFC3339 with a `Z` suffix.
///
/// Stored timestamps use this single format so that lexicographic order
/// in the store matches chronological order.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
