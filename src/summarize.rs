//! The `summarize` command: who fills the home (or a list) timeline.
//!
//! Authenticated pipeline: walk the timeline backward via a self-managed
//! `max_id` cursor, classify each entry against its own author, stop at the
//! configured item count or the end of the retained timeline, enrich the
//! accounts seen with one batched relationship lookup, and print the ranked
//! breakdowns. Also hosts the `lists` side operation.

use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;

use crate::api::Api;
use crate::classify::Reference;
use crate::models::Relationship;
use crate::paginate::TimelineSource;
use crate::pipeline;
use crate::report;
use crate::trace::Trace;
use crate::tracking::{Bound, Tracking};
use crate::transport::Transport;

pub fn run_summarize(
    transport: &dyn Transport,
    server: &str,
    token: &str,
    list: Option<String>,
    max_items: u64,
    top: usize,
    separate: bool,
    trace: &Trace,
) -> Result<()> {
    let api = Api::new(transport, server, Some(token.to_string()));

    let mut tracking = Tracking::new(Utc::now());
    let mut source = TimelineSource::new(&api, trace, list);
    pipeline::run(
        &mut source,
        Reference::Author,
        Bound::Count(max_items),
        &mut tracking,
        trace,
    )?;
    trace.fetched(tracking.total, tracking.pages);

    if tracking.total == 0 {
        println!("No posts found.");
        return Ok(());
    }

    let relations = fetch_relations(&api, &tracking)?;
    report::print_summary(&tracking, &relations, top, separate);
    Ok(())
}

/// One batched lookup for every distinct account id seen during
/// classification, re-keyed by handle for the report.
fn fetch_relations(api: &Api<'_>, tracking: &Tracking) -> Result<HashMap<String, Relationship>> {
    let ids: Vec<String> = tracking.account_ids.keys().cloned().collect();

    let mut by_handle = HashMap::new();
    for relation in api.relationships(&ids)? {
        if let Some(handle) = tracking.account_ids.get(&relation.id) {
            by_handle.insert(handle.clone(), relation);
        }
    }
    Ok(by_handle)
}

/// Fetch the viewer's lists and print them verbatim, pretty-printed.
pub fn run_lists(transport: &dyn Transport, server: &str, token: &str) -> Result<()> {
    let api = Api::new(transport, server, Some(token.to_string()));
    let lists = api.lists()?;
    println!("{}", serde_json::to_string_pretty(&lists)?);
    Ok(())
}
