//! The fetch loop shared by both commands.
//!
//! One generic walk over a [`PageSource`]: classify each item into the
//! [`Tracking`] value and re-check the [`Bound`] after every item, so a
//! bound crossing stops the run mid-page instead of waiting for the page
//! boundary. The outer loop additionally ends on an empty page or an
//! exhausted source.

use anyhow::Result;

use crate::classify::Reference;
use crate::paginate::PageSource;
use crate::trace::Trace;
use crate::tracking::{Bound, Tracking};

/// Walk pages until the bound fires or the data runs out.
///
/// The two callers differ only in what they plug in here: the page source,
/// the reference rule for thread detection, and the bound.
pub fn run(
    source: &mut dyn PageSource,
    reference: Reference<'_>,
    bound: Bound,
    tracking: &mut Tracking,
    trace: &Trace,
) -> Result<()> {
    while let Some(page) = source.next_page()? {
        if page.is_empty() {
            break;
        }
        tracking.pages += 1;
        trace.page(tracking.pages, page.len());

        for status in &page {
            let category = tracking.record(status, reference);
            trace.item(status, category);
            if bound.reached(tracking) {
                return Ok(());
            }
        }
    }
    Ok(())
}
