//! Wire types exchanged with HTTP clients.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod health;
pub mod matchmaking;
pub mod result;
pub mod room;
pub mod validation;

/// Render a [`SystemTime`] as an RFC 3339 string for response payloads.
pub fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
