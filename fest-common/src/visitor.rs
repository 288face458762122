//! Anonymous visit record
//!
//! Sent by the visitor gate when a visitor skips registration and accepted by
//! the site's ingestion endpoint. Carries only passively observable client
//! metadata, never contact details.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousVisit {
    /// Always `true` for records produced by the skip path
    pub anonymous: bool,
    pub timestamp: DateTime<Utc>,
    pub user_agent: String,
    pub referrer: String,
    pub screen_resolution: String,
    pub timezone: String,
    pub language: String,
}
