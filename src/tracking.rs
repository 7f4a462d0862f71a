//! Aggregation state for one run, and the policy that ends it.
//!
//! A single [`Tracking`] value is created when a run starts and threaded
//! explicitly through the pipeline: the classifier writes it, the reporter
//! and the [`Bound`] read it. The run is single-threaded, so there is no
//! shared mutation to guard.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::classify::{classify, Category, Reference};
use crate::models::Status;

/// Per-category count plus its per-account breakdown, keyed by handle.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Tally {
    pub total: u64,
    pub by_account: HashMap<String, u64>,
}

impl Tally {
    fn bump(&mut self, handle: &str) {
        self.total += 1;
        *self.by_account.entry(handle.to_string()).or_insert(0) += 1;
    }
}

/// Everything accumulated while walking pages.
#[derive(Debug, Clone)]
pub struct Tracking {
    /// Wall-clock snapshot taken once at run start.
    pub started_at: DateTime<Utc>,
    /// Earliest `created_at` seen so far. Only ever moves earlier.
    pub oldest: Option<DateTime<Utc>>,
    /// Items processed across all pages.
    pub total: u64,
    /// Pages fetched.
    pub pages: u64,
    pub posts: Tally,
    pub threads: Tally,
    pub replies: Tally,
    pub boosts: Tally,
    /// Authors whose statuses were boosted. A sibling breakdown, not one of
    /// the exclusive categories.
    pub boosted: Tally,
    /// Account id → handle, for the batched relationship lookup.
    pub account_ids: HashMap<String, String>,
}

impl Tracking {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            oldest: None,
            total: 0,
            pages: 0,
            posts: Tally::default(),
            threads: Tally::default(),
            replies: Tally::default(),
            boosts: Tally::default(),
            boosted: Tally::default(),
            account_ids: HashMap::new(),
        }
    }

    /// Classify one status and fold it into the running counts.
    ///
    /// Exactly one category total and one entry of that category's breakdown
    /// are incremented per call; a boost additionally bumps the `boosted`
    /// tally for the original author.
    pub fn record(&mut self, status: &Status, reference: Reference<'_>) -> Category {
        if self
            .oldest
            .map_or(true, |oldest| status.created_at < oldest)
        {
            self.oldest = Some(status.created_at);
        }
        self.account_ids
            .insert(status.account.id.clone(), status.account.acct.clone());
        self.total += 1;

        let category = classify(status, reference);
        let handle = &status.account.acct;
        match category {
            Category::Post => self.posts.bump(handle),
            Category::Thread => self.threads.bump(handle),
            Category::Reply => self.replies.bump(handle),
            Category::Boost => {
                self.boosts.bump(handle);
                if let Some(reblog) = &status.reblog {
                    self.boosted.bump(&reblog.account.acct);
                }
            }
        }
        category
    }

    pub fn tally(&self, category: Category) -> &Tally {
        match category {
            Category::Post => &self.posts,
            Category::Thread => &self.threads,
            Category::Reply => &self.replies,
            Category::Boost => &self.boosts,
        }
    }

    /// Seconds between run start and the oldest item seen, or `None` before
    /// the first item.
    pub fn duration_secs(&self) -> Option<f64> {
        self.oldest
            .map(|oldest| (self.started_at - oldest).num_milliseconds() as f64 / 1000.0)
    }
}

/// When to stop consuming items. Checked after every item so a bound can
/// fire mid-page.
#[derive(Debug, Clone, Copy)]
pub enum Bound {
    /// Stop once the window between run start and the oldest item spans at
    /// least this many days.
    Days(u32),
    /// Stop once this many items have been consumed.
    Count(u64),
}

impl Bound {
    pub fn reached(&self, tracking: &Tracking) -> bool {
        match self {
            // No items yet means no window to measure: not reached.
            Bound::Days(days) => tracking
                .duration_secs()
                .map_or(false, |secs| secs >= f64::from(*days) * 86400.0),
            Bound::Count(max) => tracking.total >= *max,
        }
    }
}
