//! End-to-end pipeline tests over an in-memory transport.
//!
//! These drive the real API layer, paginators, classifier, and bounds with
//! canned HTTP responses, so the whole fetch loop is exercised without a
//! network.

use std::cell::RefCell;

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};

use fedi_meter::api::Api;
use fedi_meter::classify::Reference;
use fedi_meter::paginate::{PageSource, PublicStatusesSource, TimelineSource};
use fedi_meter::pipeline;
use fedi_meter::summarize::run_summarize;
use fedi_meter::trace::{Level, Trace};
use fedi_meter::tracking::{Bound, Tracking};
use fedi_meter::transport::{HttpResponse, Transport};

/// Transport fake: routes each request through a closure and records every
/// call as `url` plus its rendered query.
struct FakeTransport<F>
where
    F: Fn(&str, &[(&str, String)]) -> HttpResponse,
{
    respond: F,
    log: RefCell<Vec<String>>,
}

impl<F> FakeTransport<F>
where
    F: Fn(&str, &[(&str, String)]) -> HttpResponse,
{
    fn new(respond: F) -> Self {
        Self {
            respond,
            log: RefCell::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<String> {
        self.log.borrow().clone()
    }
}

impl<F> Transport for FakeTransport<F>
where
    F: Fn(&str, &[(&str, String)]) -> HttpResponse,
{
    fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        _bearer: Option<&str>,
    ) -> Result<HttpResponse> {
        let mut rendered = url.to_string();
        for (key, value) in query {
            rendered.push_str(&format!("&{}={}", key, value));
        }
        self.log.borrow_mut().push(rendered);
        Ok((self.respond)(url, query))
    }
}

fn ok(body: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: body.to_string(),
        link: None,
    }
}

fn ok_with_link(body: &str, link: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        body: body.to_string(),
        link: Some(link.to_string()),
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 28, 12, 0, 0).unwrap()
}

fn iso(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

fn status_json(id: &str, acct_id: &str, acct: &str, created_at: DateTime<Utc>) -> String {
    format!(
        r#"{{"id": "{}", "created_at": "{}", "account": {{"id": "{}", "acct": "{}"}}}}"#,
        id,
        iso(created_at),
        acct_id,
        acct
    )
}

fn query_value<'q>(query: &'q [(&str, String)], key: &str) -> Option<&'q str> {
    query
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.as_str())
}

#[test]
fn test_public_pipeline_follows_link_cursors() {
    let first_page_url = "https://example.social/api/v1/accounts/9/statuses?limit=40";
    let next_url = "https://example.social/api/v1/accounts/9/statuses?limit=40&max_id=2";

    let page_one = format!(
        "[{}, {}]",
        status_json("4", "9", "someone", now() - Duration::hours(1)),
        status_json("3", "9", "someone", now() - Duration::hours(2)),
    );
    // Reply to the queried account's own status: a thread under the
    // viewer-reference rule.
    let page_two = format!(
        r#"[{{"id": "2", "created_at": "{}", "account": {{"id": "9", "acct": "someone"}},
            "in_reply_to_id": "1", "in_reply_to_account_id": "9"}}]"#,
        iso(now() - Duration::hours(3))
    );

    let transport = FakeTransport::new(move |url, query| {
        if url.ends_with("/accounts/lookup") {
            ok(r#"{"id": "9", "acct": "someone"}"#)
        } else if url == first_page_url {
            ok_with_link(
                &page_one,
                &format!("<{}>; rel=\"next\"", next_url),
            )
        } else if url == next_url {
            // Last page: no Link header, so the chain ends here.
            ok(&page_two)
        } else {
            panic!("unexpected request: {} {:?}", url, query);
        }
    });

    let api = Api::new(&transport, "example.social", None);
    let account_id = api.lookup_account("someone@example.social").unwrap();
    assert_eq!(account_id, "9");

    let trace = Trace::new(Level::Quiet);
    let mut tracking = Tracking::new(now());
    let mut source = PublicStatusesSource::new(&api, &trace, &account_id);
    pipeline::run(
        &mut source,
        Reference::Viewer(&account_id),
        Bound::Days(7),
        &mut tracking,
        &trace,
    )
    .unwrap();

    assert_eq!(tracking.total, 3);
    assert_eq!(tracking.posts.total, 2);
    assert_eq!(tracking.threads.total, 1);
    assert_eq!(tracking.oldest, Some(now() - Duration::hours(3)));
    // Lookup plus two pages, strictly sequential.
    assert_eq!(transport.requests().len(), 3);
}

#[test]
fn test_non_success_status_aborts_the_run() {
    let transport = FakeTransport::new(|url, _query| {
        if url.ends_with("/accounts/lookup") {
            ok(r#"{"id": "9"}"#)
        } else {
            HttpResponse {
                status: 503,
                body: String::new(),
                link: None,
            }
        }
    });

    let api = Api::new(&transport, "example.social", None);
    let account_id = api.lookup_account("someone").unwrap();

    let trace = Trace::new(Level::Quiet);
    let mut tracking = Tracking::new(now());
    let mut source = PublicStatusesSource::new(&api, &trace, &account_id);
    let err = pipeline::run(
        &mut source,
        Reference::Viewer(&account_id),
        Bound::Days(7),
        &mut tracking,
        &trace,
    )
    .unwrap_err();

    assert!(err.to_string().contains("503"), "got: {}", err);
    assert_eq!(tracking.total, 0);
}

#[test]
fn test_malformed_link_header_is_fatal() {
    let transport = FakeTransport::new(|url, _query| {
        if url.ends_with("/accounts/lookup") {
            ok(r#"{"id": "9"}"#)
        } else {
            ok_with_link("[]", "<https://example.social/x>; rel=broken")
        }
    });

    let api = Api::new(&transport, "example.social", None);
    let trace = Trace::new(Level::Quiet);
    let mut source = PublicStatusesSource::new(&api, &trace, "9");
    assert!(source.next_page().is_err());
}

#[test]
fn test_timeline_advances_max_id_until_exhausted() {
    let transport = FakeTransport::new(|url, query| {
        assert!(url.ends_with("/timelines/home"), "unexpected url: {}", url);
        match query_value(query, "max_id") {
            None => ok(&format!(
                "[{}, {}]",
                status_json("30", "1", "a", now() - Duration::minutes(5)),
                status_json("29", "2", "b", now() - Duration::minutes(6)),
            )),
            Some("29") => ok(&format!(
                "[{}]",
                status_json("10", "1", "a", now() - Duration::minutes(30))
            )),
            Some("10") => ok("[]"),
            Some(other) => panic!("unexpected max_id {}", other),
        }
    });

    let api = Api::new(&transport, "example.social", Some("tok".to_string()));
    let trace = Trace::new(Level::Quiet);
    let mut tracking = Tracking::new(now());
    let mut source = TimelineSource::new(&api, &trace, None);
    pipeline::run(
        &mut source,
        Reference::Author,
        Bound::Count(100),
        &mut tracking,
        &trace,
    )
    .unwrap();

    assert_eq!(tracking.total, 3);
    assert_eq!(tracking.pages, 2);
    // Three timeline requests: first page, page before 29, empty page
    // before 10.
    assert_eq!(transport.requests().len(), 3);
}

#[test]
fn test_duplicate_boundary_ids_still_terminate() {
    // A server repeating the same page for every max_id must not loop
    // forever: the count bound fires.
    let page = format!(
        "[{}, {}]",
        status_json("7", "1", "a", now() - Duration::minutes(5)),
        status_json("6", "2", "b", now() - Duration::minutes(6)),
    );
    let transport = FakeTransport::new(move |_url, _query| ok(&page));

    let api = Api::new(&transport, "example.social", Some("tok".to_string()));
    let trace = Trace::new(Level::Quiet);
    let mut tracking = Tracking::new(now());
    let mut source = TimelineSource::new(&api, &trace, None);
    pipeline::run(
        &mut source,
        Reference::Author,
        Bound::Count(5),
        &mut tracking,
        &trace,
    )
    .unwrap();

    assert_eq!(tracking.total, 5);
}

#[test]
fn test_empty_timeline_skips_relation_lookup() {
    let transport = FakeTransport::new(|_url, _query| ok("[]"));

    run_summarize(
        &transport,
        "example.social",
        "tok",
        None,
        1000,
        10,
        false,
        &Trace::new(Level::Quiet),
    )
    .unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].contains("relationships"));
}

#[test]
fn test_summarize_issues_one_batched_relation_lookup() {
    let transport = FakeTransport::new(|url, query| {
        if url.ends_with("/timelines/home") {
            match query_value(query, "max_id") {
                None => ok(&format!(
                    "[{}, {}]",
                    status_json("30", "1", "a@x.y", now() - Duration::hours(1)),
                    status_json("29", "2", "b@x.y", now() - Duration::hours(2)),
                )),
                Some(_) => ok("[]"),
            }
        } else if url.ends_with("/accounts/relationships") {
            ok(r#"[{"id": "1", "following": true, "showing_reblogs": false}]"#)
        } else {
            panic!("unexpected request: {}", url);
        }
    });

    run_summarize(
        &transport,
        "example.social",
        "tok",
        None,
        1000,
        10,
        false,
        &Trace::new(Level::Quiet),
    )
    .unwrap();

    let requests = transport.requests();
    let relation_requests: Vec<&String> = requests
        .iter()
        .filter(|r| r.contains("relationships"))
        .collect();
    assert_eq!(relation_requests.len(), 1);
    // Both distinct account ids went into the one batched call.
    assert!(relation_requests[0].contains("id[]=1"));
    assert!(relation_requests[0].contains("id[]=2"));
}

#[test]
fn test_list_timeline_uses_list_endpoint() {
    let transport = FakeTransport::new(|url, _query| {
        assert!(
            url.ends_with("/timelines/list/4711"),
            "unexpected url: {}",
            url
        );
        ok("[]")
    });

    let api = Api::new(&transport, "example.social", Some("tok".to_string()));
    let trace = Trace::new(Level::Quiet);
    let mut source = TimelineSource::new(&api, &trace, Some("4711".to_string()));
    let page = source.next_page().unwrap().unwrap();
    assert!(page.is_empty());
}
