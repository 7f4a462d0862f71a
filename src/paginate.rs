//! Cursor-linked pagination.
//!
//! Two ways of walking a status list, behind one [`PageSource`] trait:
//!
//! - [`PublicStatusesSource`] follows the `next` URL from the response's
//!   `Link` header (public account-statuses endpoint).
//! - [`TimelineSource`] manages its own `max_id` cursor, taken from the last
//!   item of each page and re-issued as a query parameter (authenticated
//!   home/list timelines, which iterate strictly backward from now).
//!
//! Each call fetches exactly one page; requests are strictly sequential
//! because every cursor depends on the previous response.

use anyhow::{Context, Result};
use regex::Regex;

use crate::api::Api;
use crate::models::Status;
use crate::trace::Trace;

/// Forward/backward cursors from a `Link` header. Only `next` (older items)
/// drives pagination; `prev` is kept for debug symmetry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursors {
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Parse a `Link` header of comma-separated `<url>; rel="next"|"prev"`
/// entries. An entry that does not match that exact grammar is an error,
/// never silently skipped.
pub fn parse_link_header(header: &str) -> Result<Cursors> {
    let entry_re = Regex::new(r#"^<([^>]+)>;\s*rel="(next|prev)"$"#)
        .context("Invalid link-entry pattern")?;

    let mut cursors = Cursors::default();
    for entry in header.split(',').map(str::trim) {
        let captures = entry_re
            .captures(entry)
            .with_context(|| format!("Malformed Link header entry: '{}'", entry))?;
        let url = captures[1].to_string();
        match &captures[2] {
            "next" => cursors.next = Some(url),
            _ => cursors.prev = Some(url),
        }
    }
    Ok(cursors)
}

/// Yields pages of statuses until the source is exhausted.
pub trait PageSource {
    /// Fetch the next page, or `None` when no further page exists. An empty
    /// page is returned as-is; the caller treats it as end-of-data.
    fn next_page(&mut self) -> Result<Option<Vec<Status>>>;
}

/// Pages of an account's public statuses, linked by the `Link` header.
pub struct PublicStatusesSource<'a> {
    api: &'a Api<'a>,
    trace: &'a Trace,
    /// URL of the page to fetch next; `None` once the chain ends.
    next_url: Option<String>,
}

impl<'a> PublicStatusesSource<'a> {
    pub fn new(api: &'a Api<'a>, trace: &'a Trace, account_id: &str) -> Self {
        Self {
            api,
            trace,
            next_url: Some(api.statuses_url(account_id)),
        }
    }
}

impl PageSource for PublicStatusesSource<'_> {
    fn next_page(&mut self) -> Result<Option<Vec<Status>>> {
        let url = match self.next_url.take() {
            Some(url) => url,
            None => return Ok(None),
        };
        self.trace.request(&url);
        let (statuses, cursors) = self.api.statuses_page(&url)?;
        self.trace.cursors(&cursors);
        self.next_url = cursors.next;
        Ok(Some(statuses))
    }
}

/// Pages of the authenticated home (or list) timeline, cursored by `max_id`.
pub struct TimelineSource<'a> {
    api: &'a Api<'a>,
    trace: &'a Trace,
    list: Option<String>,
    max_id: Option<String>,
    exhausted: bool,
}

impl<'a> TimelineSource<'a> {
    pub fn new(api: &'a Api<'a>, trace: &'a Trace, list: Option<String>) -> Self {
        Self {
            api,
            trace,
            list,
            max_id: None,
            exhausted: false,
        }
    }
}

impl PageSource for TimelineSource<'_> {
    fn next_page(&mut self) -> Result<Option<Vec<Status>>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(id) = &self.max_id {
            self.trace.request(&format!("timeline page before id {}", id));
        } else {
            self.trace.request("timeline first page");
        }
        let statuses = self
            .api
            .timeline_page(self.list.as_deref(), self.max_id.as_deref())?;

        // The server does not keep timelines indefinitely; an empty page
        // means the end was reached before the requested count.
        match statuses.last() {
            Some(last) => self.max_id = Some(last.id.clone()),
            None => self.exhausted = true,
        }
        Ok(Some(statuses))
    }
}
