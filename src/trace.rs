//! Observational trace output for the fetch loop.
//!
//! Trace lines are emitted on **stderr** so stdout remains parseable for
//! scripts. Nothing here affects control flow: the pipeline behaves the same
//! at every level.
//!
//! Levels nest: `Progress` shows one line per fetched page, `Verbose` adds a
//! classification line per item, `Debug` adds request URLs and parsed
//! cursors. The default is `Progress` when stderr is a TTY, `Quiet`
//! otherwise.

use std::io::Write;

use chrono::SecondsFormat;

use crate::classify::Category;
use crate::models::Status;
use crate::paginate::Cursors;

#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Level {
    Quiet,
    Progress,
    Verbose,
    Debug,
}

impl Level {
    /// Default: page progress when stderr is a TTY, otherwise quiet.
    pub fn default_for_tty() -> Self {
        if atty::is(atty::Stream::Stderr) {
            Level::Progress
        } else {
            Level::Quiet
        }
    }

    /// Resolve the level from the CLI flags, falling back to the TTY default.
    pub fn from_flags(verbose: bool, debug: bool) -> Self {
        if debug {
            Level::Debug
        } else if verbose {
            Level::Verbose
        } else {
            Level::default_for_tty()
        }
    }
}

/// Writes trace lines for one run.
pub struct Trace {
    level: Level,
}

impl Trace {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    fn emit(&self, at: Level, line: &str) {
        if self.level >= at {
            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "{}", line);
            let _ = stderr.flush();
        }
    }

    /// One fetched page: ordinal and item count.
    pub fn page(&self, number: u64, items: usize) {
        self.emit(Level::Progress, &format!("page {}: {} items", number, items));
    }

    /// One classified item, in the original operator-facing shape.
    pub fn item(&self, status: &Status, category: Category) {
        if self.level < Level::Verbose {
            return;
        }
        let acct = &status.account.acct;
        let what = match category {
            Category::Boost => match &status.reblog {
                Some(reblog) => {
                    format!("Boost by {} of post by {}", acct, reblog.account.acct)
                }
                None => format!("Boost by {}", acct),
            },
            Category::Thread => format!("Thread-reply by {}", acct),
            Category::Reply => {
                let mentions: Vec<&str> =
                    status.mentions.iter().map(|m| m.acct.as_str()).collect();
                if mentions.is_empty() {
                    format!("Reply by {}", acct)
                } else {
                    format!("Reply to {} by {}", mentions.join(", "), acct)
                }
            }
            Category::Post => format!("Post by {}", acct),
        };
        self.emit(
            Level::Verbose,
            &format!(
                "[{}] {}: {}",
                status.id,
                status
                    .created_at
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
                what
            ),
        );
    }

    /// The URL about to be fetched.
    pub fn request(&self, url: &str) {
        self.emit(Level::Debug, &format!("Fetching <{}>...", url));
    }

    /// Totals once the fetch loop ends.
    pub fn fetched(&self, items: u64, pages: u64) {
        self.emit(
            Level::Debug,
            &format!("Fetched {} posts in {} requests.", items, pages),
        );
    }

    /// Cursors parsed from a `Link` header.
    pub fn cursors(&self, cursors: &Cursors) {
        self.emit(
            Level::Debug,
            &format!(
                "Link cursors: next={} prev={}",
                cursors.next.as_deref().unwrap_or("-"),
                cursors.prev.as_deref().unwrap_or("-"),
            ),
        );
    }
}
