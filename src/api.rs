//! Mastodon REST endpoints used by the pipelines.
//!
//! [`Api`] wraps a [`Transport`] with the server host and an optional bearer
//! token, and exposes one method per endpoint. Any non-success status is a
//! fatal error carrying the URL and the code — there are no retries; the
//! caller propagates the error and the run aborts before printing a report.

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::models::{Relationship, Status};
use crate::paginate::{parse_link_header, Cursors};
use crate::transport::{HttpResponse, Transport};

/// Server-side maximum page size for status lists.
pub const PAGE_LIMIT: u32 = 40;

pub struct Api<'a> {
    transport: &'a dyn Transport,
    server: String,
    token: Option<String>,
}

impl<'a> Api<'a> {
    pub fn new(transport: &'a dyn Transport, server: &str, token: Option<String>) -> Self {
        Self {
            transport,
            server: server.to_string(),
            token,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("https://{}/api/v1/{}", self.server, path)
    }

    /// GET with the configured bearer token and a fatal check on the status.
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpResponse> {
        let response = self.transport.get(url, query, self.token.as_deref())?;
        if !(200..300).contains(&response.status) {
            bail!("Unexpected HTTP status {} for {}", response.status, url);
        }
        Ok(response)
    }

    /// Resolve a handle to the opaque account identifier the server uses.
    ///
    /// The statuses endpoint is keyed by this identifier, not the handle.
    pub fn lookup_account(&self, handle: &str) -> Result<String> {
        #[derive(Deserialize)]
        struct Lookup {
            id: String,
        }

        let url = self.endpoint("accounts/lookup");
        let response = self.get(&url, &[("acct", handle.to_string())])?;
        let lookup: Lookup = serde_json::from_str(&response.body)
            .with_context(|| format!("Failed to decode account lookup for '{}'", handle))?;
        Ok(lookup.id)
    }

    /// The URL of the first public-statuses page for an account.
    pub fn statuses_url(&self, account_id: &str) -> String {
        self.endpoint(&format!(
            "accounts/{}/statuses?limit={}",
            account_id, PAGE_LIMIT
        ))
    }

    /// Fetch one page of public statuses from an absolute URL (the first page
    /// from [`Api::statuses_url`], later ones the header-supplied next URL,
    /// followed verbatim) and parse the sibling `Link` cursors.
    pub fn statuses_page(&self, url: &str) -> Result<(Vec<Status>, Cursors)> {
        let response = self.get(url, &[])?;
        let statuses: Vec<Status> = serde_json::from_str(&response.body)
            .with_context(|| format!("Failed to decode statuses page from {}", url))?;
        let cursors = match response.link {
            Some(ref header) => parse_link_header(header)?,
            None => Cursors::default(),
        };
        Ok((statuses, cursors))
    }

    /// Fetch one page of the home timeline, or of a list's timeline.
    ///
    /// Pagination here is self-managed via `max_id`; the response headers are
    /// not consulted.
    pub fn timeline_page(&self, list: Option<&str>, max_id: Option<&str>) -> Result<Vec<Status>> {
        let path = match list {
            Some(id) => format!("timelines/list/{}", id),
            None => "timelines/home".to_string(),
        };
        let url = self.endpoint(&path);

        let mut query = vec![("limit", PAGE_LIMIT.to_string())];
        if let Some(id) = max_id {
            query.push(("max_id", id.to_string()));
        }

        let response = self.get(&url, &query)?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("Failed to decode timeline page from {}", url))
    }

    /// One batched relationships lookup for all distinct account ids seen
    /// during classification.
    pub fn relationships(&self, ids: &[String]) -> Result<Vec<Relationship>> {
        let url = self.endpoint("accounts/relationships");
        let query: Vec<(&str, String)> = ids.iter().map(|id| ("id[]", id.clone())).collect();
        let response = self.get(&url, &query)?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("Failed to decode relationships from {}", url))
    }

    /// The viewer's lists, as raw JSON for verbatim pretty-printing.
    pub fn lists(&self) -> Result<serde_json::Value> {
        let url = self.endpoint("lists");
        let response = self.get(&url, &[])?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("Failed to decode lists from {}", url))
    }
}
