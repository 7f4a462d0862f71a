//! Core data models used throughout fedi-meter.
//!
//! These types mirror the subset of the Mastodon status JSON that the
//! classification pipeline needs. Unknown fields are ignored at decode time.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of a timeline or account-statuses page.
///
/// `reblog` being present means the entry is a boost and carries the boosted
/// status (with its own author). `in_reply_to_account_id` is the id of the
/// account being replied to, when the entry is a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub account: Account,
    #[serde(default)]
    pub reblog: Option<Box<Status>>,
    #[serde(default)]
    pub in_reply_to_id: Option<String>,
    #[serde(default)]
    pub in_reply_to_account_id: Option<String>,
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

/// The authoring account of a status.
///
/// `id` is the opaque server-assigned identifier (the join key for relation
/// lookups); `acct` is the human-readable handle used for display.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: String,
    pub acct: String,
}

/// An account mentioned in a reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Mention {
    pub acct: String,
}

/// Relationship flags between the viewer and another account, as returned by
/// the relationships endpoint. Keyed by account id on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Relationship {
    pub id: String,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub showing_reblogs: bool,
}
