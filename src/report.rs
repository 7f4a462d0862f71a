//! Report rendering.
//!
//! Two renderings over the same [`Tracking`] value, printed to stdout: the
//! public-analysis totals and the authenticated-timeline summary with ranked
//! per-account breakdowns and relation annotations.

use std::collections::HashMap;

use chrono::SecondsFormat;

use crate::models::Relationship;
use crate::tracking::{Tally, Tracking};

/// Floor for the observed window, so a run whose items all landed within
/// the same second cannot divide by zero.
const MIN_DURATION_SECS: f64 = 1.0;

/// Items per day over the observed window.
pub fn per_day_rate(count: u64, duration_secs: f64) -> f64 {
    count as f64 / (duration_secs.max(MIN_DURATION_SECS) / 86400.0)
}

/// Handle with its relation suffix: `B` when boosts from the account are
/// shown, `F` when followed. A handle without a relation entry (e.g. the
/// viewer's own) renders unchanged.
pub fn display_handle(handle: &str, relations: &HashMap<String, Relationship>) -> String {
    let mut suffix = String::new();
    if let Some(relation) = relations.get(handle) {
        if relation.showing_reblogs {
            suffix.push('B');
        }
        if relation.following {
            suffix.push('F');
        }
    }
    if suffix.is_empty() {
        handle.to_string()
    } else {
        format!("{}[{}]", handle, suffix)
    }
}

/// Breakdown entries sorted by count descending (handle ascending on ties,
/// for stable output), truncated to `top`.
pub fn ranked(tally: &Tally, top: usize) -> Vec<(&str, u64)> {
    let mut entries: Vec<(&str, u64)> = tally
        .by_account
        .iter()
        .map(|(handle, count)| (handle.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(top);
    entries
}

/// Sum of two tallies, merging their breakdowns.
pub fn merged(a: &Tally, b: &Tally) -> Tally {
    let mut out = a.clone();
    out.total += b.total;
    for (handle, count) in &b.by_account {
        *out.by_account.entry(handle.clone()).or_insert(0) += count;
    }
    out
}

/// Totals-only report for the public-analysis run.
pub fn print_analysis(tracking: &Tracking) {
    let (oldest, duration) = match (tracking.oldest, tracking.duration_secs()) {
        (Some(oldest), Some(duration)) => (oldest, duration),
        _ => {
            println!("No posts found.");
            return;
        }
    };

    println!(
        "Oldest post/boost/reply/thread: {}",
        oldest.to_rfc3339_opts(SecondsFormat::Millis, true)
    );
    println!(
        "This covers {:.1} seconds, {:.1} hour(s), or {:.1} day(s)",
        duration,
        duration / 3600.0,
        duration / 86400.0
    );

    let combined = tracking.posts.total + tracking.threads.total;
    println!(
        "Posts + threads: {:4} ({:5.1} per day)",
        combined,
        per_day_rate(combined, duration)
    );
    println!(
        "Boosts:          {:4} ({:5.1} per day)",
        tracking.boosts.total,
        per_day_rate(tracking.boosts.total, duration)
    );
    println!(
        "Replies:         {:4} ({:5.1} per day)",
        tracking.replies.total,
        per_day_rate(tracking.replies.total, duration)
    );
}

/// Ranked summary for the authenticated-timeline run.
pub fn print_summary(
    tracking: &Tracking,
    relations: &HashMap<String, Relationship>,
    top: usize,
    separate: bool,
) {
    let (oldest, duration) = match (tracking.oldest, tracking.duration_secs()) {
        (Some(oldest), Some(duration)) => (oldest, duration),
        _ => {
            println!("No posts found.");
            return;
        }
    };

    let oldest_display = oldest.to_rfc3339_opts(SecondsFormat::Millis, true);
    if duration < 86400.0 {
        println!(
            "Posts going back to {}; {:.1} hour(s)",
            oldest_display,
            duration / 3600.0
        );
    } else {
        println!(
            "Posts going back to {}; {:.1} day(s)",
            oldest_display,
            duration / 86400.0
        );
    }
    println!();
    println!("Summary:");

    if separate {
        print_section("Posts", &tracking.posts, duration, relations, top);
        print_section(
            "Replies to self",
            &tracking.threads,
            duration,
            relations,
            top,
        );
    } else {
        let combo = merged(&tracking.posts, &tracking.threads);
        print_section("Posts + replies to self", &combo, duration, relations, top);
    }

    print_section(
        "Replies to others",
        &tracking.replies,
        duration,
        relations,
        top,
    );
    print_section("Boosts", &tracking.boosts, duration, relations, top);
    print_section("Boosted", &tracking.boosted, duration, relations, top);
}

fn print_section(
    title: &str,
    tally: &Tally,
    duration_secs: f64,
    relations: &HashMap<String, Relationship>,
    top: usize,
) {
    println!(
        "  {}: {} ({:.1} per day)",
        title,
        tally.total,
        per_day_rate(tally.total, duration_secs)
    );
    for (handle, count) in ranked(tally, top) {
        println!(
            "    {:<40} - {:3} [{:4.1}]",
            display_handle(handle, relations),
            count,
            per_day_rate(count, duration_secs)
        );
    }
    println!();
}
