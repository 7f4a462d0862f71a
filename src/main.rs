//! # fedi-meter CLI (`fedi`)
//!
//! The `fedi` binary analyzes Mastodon timelines from the command line.
//!
//! ## Usage
//!
//! ```bash
//! fedi --config ./config/fedi.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fedi analyze` | Classify one account's recent public statuses over a day window |
//! | `fedi summarize` | Break down who fills the home (or a list) timeline |
//! | `fedi lists` | Print the viewer's lists as pretty JSON |
//!
//! ## Examples
//!
//! ```bash
//! # What kind of output to expect from an account, over the last 7 days
//! fedi analyze --user someone@example.social --server example.social
//!
//! # Who posts and boosts the most on the home timeline
//! fedi summarize --server example.social --token @$HOME/.fedi-token
//!
//! # The same for a specific list, top 5 accounts per section
//! fedi summarize --server example.social --token @$HOME/.fedi-token \
//!     --list 4711 --top 5
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fedi_meter::config::{self, Config};
use fedi_meter::trace::{Level, Trace};
use fedi_meter::transport::ReqwestTransport;
use fedi_meter::{analyze, summarize};

const DEFAULT_CONFIG: &str = "./config/fedi.toml";

/// fedi-meter — timeline analytics for Mastodon-compatible servers.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file at the default path just means built-in defaults.
/// Command-line flags always override config values.
#[derive(Parser)]
#[command(
    name = "fedi",
    about = "Timeline analytics for Mastodon-compatible servers",
    version,
    long_about = "fedi-meter fetches paginated status lists from a Mastodon-compatible server, \
    classifies each entry (post, reply-to-self, reply-to-other, boost), and reports per-category \
    totals, per-day rates, and ranked per-account breakdowns over a bounded time or item window."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Supplies defaults for server, token, day window, item ceiling, and
    /// top-N. Optional; flags win over config values.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Print a classification line per item on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print request URLs and pagination cursors on stderr.
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Analyze one account's recent public statuses.
    ///
    /// Resolves the handle, walks the account's public statuses backward
    /// until the fetched window spans the configured number of days, and
    /// prints how much of it is posts, threads, replies, and boosts. Uses
    /// only public endpoints; no token required.
    Analyze {
        /// Account handle to analyze (e.g. `someone@example.social`).
        #[arg(short, long)]
        user: String,

        /// Hostname of the server to query.
        #[arg(short, long)]
        server: Option<String>,

        /// Day window to cover (default 7).
        #[arg(long)]
        days: Option<u32>,
    },

    /// Summarize the home timeline, or one list's timeline.
    ///
    /// Walks the authenticated timeline backward, classifies every entry
    /// against its own author, annotates accounts with relationship flags
    /// (B = boosts shown, F = following), and prints ranked per-account
    /// breakdowns. Requires a token with read scope.
    Summarize {
        /// Hostname of the server to query.
        #[arg(short, long)]
        server: Option<String>,

        /// Bearer token ('read' scope). Prefix with @ to read from a file.
        #[arg(short, long)]
        token: Option<String>,

        /// Summarize this list's timeline instead of the home timeline.
        #[arg(short, long)]
        list: Option<String>,

        /// Entries shown per breakdown section (default 10).
        #[arg(long)]
        top: Option<usize>,

        /// Separate 'posts' and 'replies to self' instead of one section.
        #[arg(long)]
        separate: bool,

        /// How many posts to fetch, at the most (default 1000).
        #[arg(long)]
        max: Option<u64>,
    },

    /// Print the viewer's lists as pretty JSON.
    ///
    /// Side operation for finding the list id to pass to `summarize --list`.
    Lists {
        /// Hostname of the server to query.
        #[arg(short, long)]
        server: Option<String>,

        /// Bearer token ('read' scope). Prefix with @ to read from a file.
        #[arg(short, long)]
        token: Option<String>,
    },
}

/// Pick the server host from the flag or the config.
fn resolve_server(flag: Option<String>, config: &Config) -> Result<String> {
    match flag.or_else(|| config.server.host.clone()) {
        Some(host) => Ok(host),
        None => bail!("No server specified (use --server or set [server].host in the config)"),
    }
}

/// Pick the bearer token from the flag or the config; required here.
fn require_token(flag: Option<String>, config: &Config) -> Result<String> {
    match config::resolve_token(flag.as_deref(), config)? {
        Some(token) => Ok(token),
        None => bail!(
            "No token specified (use --token, or set [auth].token or [auth].token_file in the config)"
        ),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A missing config file at the default path just means defaults; an
    // explicitly named file must exist.
    let cfg = if cli.config.exists() {
        config::load_config(&cli.config)?
    } else if cli.config.as_os_str() != DEFAULT_CONFIG {
        bail!("Config file not found: {}", cli.config.display());
    } else {
        Config::minimal()
    };

    let trace = Trace::new(Level::from_flags(cli.verbose, cli.debug));
    let transport = ReqwestTransport::new()?;

    match cli.command {
        Commands::Analyze { user, server, days } => {
            let server = resolve_server(server, &cfg)?;
            let days = days.unwrap_or(cfg.fetch.days);
            analyze::run_analyze(&transport, &server, &user, days, &trace)?;
        }
        Commands::Summarize {
            server,
            token,
            list,
            top,
            separate,
            max,
        } => {
            let server = resolve_server(server, &cfg)?;
            let token = require_token(token, &cfg)?;
            summarize::run_summarize(
                &transport,
                &server,
                &token,
                list,
                max.unwrap_or(cfg.fetch.max_items),
                top.unwrap_or(cfg.report.top),
                separate,
                &trace,
            )?;
        }
        Commands::Lists { server, token } => {
            let server = resolve_server(server, &cfg)?;
            let token = require_token(token, &cfg)?;
            summarize::run_lists(&transport, &server, &token)?;
        }
    }

    Ok(())
}
