//! Synchronous HTTP transport seam.
//!
//! The pipeline only ever needs one operation: a blocking GET with optional
//! query parameters and an optional bearer token, returning the status code,
//! the body text, and the pagination `Link` header when the server sends one.
//! Keeping that behind [`Transport`] lets the tests drive the whole pipeline
//! with an in-memory fake instead of a live server.
//!
//! Timeouts are left to the client library's defaults; pagination is strictly
//! sequential so there is never more than one request in flight.

use anyhow::{Context, Result};

/// Response of one transport request. Status interpretation happens in the
/// API layer so fakes can return error statuses.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
    /// Raw `Link` header, when present.
    pub link: Option<String>,
}

/// A synchronous request/response capability.
pub trait Transport {
    /// Issue one blocking GET for `url` with `query` appended and, when
    /// `bearer` is set, an `Authorization: Bearer` header.
    fn get(&self, url: &str, query: &[(&str, String)], bearer: Option<&str>)
        -> Result<HttpResponse>;
}

/// [`Transport`] backed by `reqwest::blocking`. The client's connection pool
/// lives as long as this value, which is scoped to the run.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("fedi-meter/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .with_context(|| format!("Request failed for {}", url))?;

        let status = response.status().as_u16();
        let link = response
            .headers()
            .get(reqwest::header::LINK)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response
            .text()
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(HttpResponse { status, body, link })
    }
}
