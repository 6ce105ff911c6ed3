//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and loads settings
//! - initialises logging
//! - builds the feed catalog
//! - runs the pipeline
//! - prints the summary and writes the optional export

use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, FeedsArgs, RunArgs};
use crate::config::Settings;
use crate::data::HttpFetcher;
use crate::domain::catalog::builtin_feeds;
use crate::domain::{FeedDescriptor, RunConfig, validate_descriptors};
use crate::error::{AppError, EXIT_FEED_FAILED};

pub mod pipeline;

/// Entry point for the `threat-digest` binary.
pub fn run() -> Result<(), AppError> {
    // `threat-digest` and `threat-digest --date ...` behave like `threat-digest run ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = Cli::parse_from(argv);
    init_logging(cli.verbose);

    let settings = Settings::from_env()?;

    match cli.command {
        Command::Run(args) => handle_run(args, settings),
        Command::Feeds(args) => handle_feeds(args, settings),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "threat_digest=debug"
    } else {
        "threat_digest=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Ignore the error if a subscriber is already installed (e.g. embedding).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_run(args: RunArgs, settings: Settings) -> Result<(), AppError> {
    let config = run_config_from_args(&args, settings, Utc::now());
    let feeds = select_feeds(
        builtin_feeds(config.c2_url_template.as_deref()),
        &config.only_feeds,
    )?;

    info!(
        feeds = feeds.len(),
        reference = %config.reference_time,
        parallel = config.parallel,
        "starting run"
    );

    let fetcher = HttpFetcher::new(config.timeout)?;
    let options = pipeline::PipelineOptions {
        parallel: config.parallel,
        nvd_api_key: config.nvd_api_key.as_deref(),
    };
    let results = pipeline::run(&feeds, config.reference_time, &fetcher, &options);

    println!("{}", crate::report::format_run_summary(&results, config.show));

    if let Some(path) = &config.export {
        crate::io::export::write_results_json(path, &results)?;
        info!(path = %path.display(), "exported results");
    }

    let failed = results.failed_count();
    if config.strict && failed > 0 {
        return Err(AppError::new(
            EXIT_FEED_FAILED,
            format!("{failed} of {} feed(s) failed.", results.feeds.len()),
        ));
    }
    Ok(())
}

fn handle_feeds(args: FeedsArgs, settings: Settings) -> Result<(), AppError> {
    let template = args.source.c2_url_template.or(settings.c2_url_template);
    let feeds = builtin_feeds(template.as_deref());
    validate_descriptors(&feeds)?;
    println!("{}", crate::report::format_catalog(&feeds));
    Ok(())
}

/// Merge CLI flags over environment settings.
pub fn run_config_from_args(args: &RunArgs, settings: Settings, now: DateTime<Utc>) -> RunConfig {
    let reference_time = match args.date {
        Some(date) => date.and_time(NaiveTime::MIN).and_utc(),
        None => now,
    };

    RunConfig {
        reference_time,
        only_feeds: args.feeds.clone(),
        timeout: args.timeout.map(Duration::from_secs).unwrap_or(settings.timeout),
        parallel: !args.sequential,
        export: args.export.clone(),
        show: args.show,
        strict: args.strict,
        nvd_api_key: settings.nvd_api_key,
        c2_url_template: args.source.c2_url_template.clone().or(settings.c2_url_template),
    }
}

/// Validate the catalog and keep only the requested feeds (all when `only` is empty).
pub fn select_feeds(
    feeds: Vec<FeedDescriptor>,
    only: &[String],
) -> Result<Vec<FeedDescriptor>, AppError> {
    validate_descriptors(&feeds)?;
    if only.is_empty() {
        return Ok(feeds);
    }

    for name in only {
        if !feeds.iter().any(|d| &d.name == name) {
            let known: Vec<&str> = feeds.iter().map(|d| d.name.as_str()).collect();
            return Err(AppError::usage(format!(
                "Unknown feed `{name}`. Known feeds: {}",
                known.join(", ")
            )));
        }
    }
    Ok(feeds.into_iter().filter(|d| only.contains(&d.name)).collect())
}

/// Rewrite argv so the binary defaults to `run`.
///
/// Rules:
/// - `threat-digest`                       -> `threat-digest run`
/// - `threat-digest --date 2024-01-03 ...` -> `threat-digest run --date 2024-01-03 ...`
/// - `--help/--version/-h/-V/help`         -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("run".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "run" | "feeds");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "run flags".
    if arg1.starts_with('-') {
        argv.insert(1, "run".to_string());
        return argv;
    }

    argv
}
