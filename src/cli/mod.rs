//! Command-line parsing.
//!
//! Argument parsing and dispatch live here and in `app`; the pipeline itself
//! knows nothing about flags.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "threat-digest",
    version,
    about = "Collect recent entries from public threat-intelligence feeds"
)]
pub struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every feed, print a summary, and optionally export JSON.
    Run(RunArgs),
    /// List the configured feeds.
    Feeds(FeedsArgs),
}

#[derive(Debug, Args, Clone, Default)]
pub struct SourceArgs {
    /// URL template for the daily C2 feed, with `{month}` and `{date}` placeholders.
    #[arg(long = "c2-url-template", value_name = "TEMPLATE")]
    pub c2_url_template: Option<String>,
}

/// Options for a feed run.
#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Reference date (YYYY-MM-DD, UTC). Defaults to now.
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Only run the named feed (repeatable).
    #[arg(long = "feed", value_name = "NAME")]
    pub feeds: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Run feeds one after another instead of concurrently.
    #[arg(long)]
    pub sequential: bool,

    /// Write all results as JSON to this path.
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Entries to print per feed.
    #[arg(long, default_value_t = 5)]
    pub show: usize,

    /// Exit with status 3 if any feed failed.
    #[arg(long)]
    pub strict: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

/// Options for listing feeds.
#[derive(Debug, Args, Clone)]
pub struct FeedsArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{raw}': {e}"))
}
