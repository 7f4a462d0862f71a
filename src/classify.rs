//! Status classification.
//!
//! Every status lands in exactly one [`Category`], decided from its fields
//! alone by a fixed precedence: boost first, then replies split on whether
//! the reply target matches the reference account, everything else is an
//! original post.

use crate::models::Status;

/// Mutually-exclusive kind of a timeline entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Category {
    /// Original post, neither boost nor reply.
    Post,
    /// Reply to the reference account's own status.
    Thread,
    /// Reply to some other account.
    Reply,
    /// Re-share of another status.
    Boost,
}

/// Which account a reply is compared against to tell a thread from a reply.
///
/// The public-analysis pipeline asks "who replies to this specific person"
/// and compares against the queried account; the timeline summarizer asks
/// "who replies to themselves" and compares against each item's own author.
/// The asymmetry is deliberate.
#[derive(Clone, Copy, Debug)]
pub enum Reference<'a> {
    /// The account the run was asked about, by id.
    Viewer(&'a str),
    /// Each status's own author.
    Author,
}

/// Assign the category for one status.
pub fn classify(status: &Status, reference: Reference<'_>) -> Category {
    if status.reblog.is_some() {
        return Category::Boost;
    }
    if status.in_reply_to_id.is_some() {
        let reference_id = match reference {
            Reference::Viewer(id) => id,
            Reference::Author => status.account.id.as_str(),
        };
        return match status.in_reply_to_account_id.as_deref() {
            Some(target) if target == reference_id => Category::Thread,
            _ => Category::Reply,
        };
    }
    Category::Post
}
