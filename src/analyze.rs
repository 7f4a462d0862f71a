//! The `analyze` command: what kind of output to expect from one account.
//!
//! Public pipeline, no auth: resolve the handle to an account id, walk the
//! account's public statuses via the `Link` cursor chain, classify each
//! entry against the queried account, stop once the window spans the
//! configured number of days, and print the totals.

use anyhow::Result;
use chrono::Utc;

use crate::api::Api;
use crate::classify::Reference;
use crate::paginate::PublicStatusesSource;
use crate::pipeline;
use crate::report;
use crate::trace::Trace;
use crate::tracking::{Bound, Tracking};
use crate::transport::Transport;

pub fn run_analyze(
    transport: &dyn Transport,
    server: &str,
    user: &str,
    days: u32,
    trace: &Trace,
) -> Result<()> {
    let api = Api::new(transport, server, None);
    let account_id = api.lookup_account(user)?;

    let mut tracking = Tracking::new(Utc::now());
    let mut source = PublicStatusesSource::new(&api, trace, &account_id);
    pipeline::run(
        &mut source,
        Reference::Viewer(&account_id),
        Bound::Days(days),
        &mut tracking,
        trace,
    )?;
    trace.fetched(tracking.total, tracking.pages);

    report::print_analysis(&tracking);
    Ok(())
}
