//! Feed pipeline shared by every front-end.
//!
//! Per feed: fetch -> (locate header) -> parse -> (date window) -> `FeedResult`.
//!
//! Feeds are independent: any `FeedError` is caught here and becomes an empty,
//! failure-flagged result for that feed alone. Nothing a feed does can stop the
//! others, so they may run in parallel.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::data::{Fetch, NvdClient, fetch_with_fallback};
use crate::domain::{FeedDescriptor, FeedEntries, FeedResult, FeedResults, FeedStats, Retrieval, Schema};
use crate::error::FeedError;
use crate::filter::apply_window;
use crate::io::{ParsedRecords, locate_header, parse_fixed_records, parse_lines, parse_records};

/// Knobs that apply to a whole run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions<'a> {
    /// Run feeds concurrently (one rayon task per feed).
    pub parallel: bool,
    /// Sent to the vulnerability API when present.
    pub nvd_api_key: Option<&'a str>,
}

/// Run every descriptor and collect one result per feed.
pub fn run(
    descriptors: &[FeedDescriptor],
    reference_time: DateTime<Utc>,
    fetcher: &dyn Fetch,
    options: &PipelineOptions<'_>,
) -> FeedResults {
    let results: Vec<FeedResult> = if options.parallel {
        descriptors
            .par_iter()
            .map(|d| run_feed(d, reference_time, fetcher, options.nvd_api_key))
            .collect()
    } else {
        descriptors
            .iter()
            .map(|d| run_feed(d, reference_time, fetcher, options.nvd_api_key))
            .collect()
    };

    FeedResults {
        reference_time,
        feeds: results.into_iter().map(|r| (r.name.clone(), r)).collect(),
    }
}

/// Run a single feed; never fails, failures are folded into the result.
pub fn run_feed(
    descriptor: &FeedDescriptor,
    reference_time: DateTime<Utc>,
    fetcher: &dyn Fetch,
    nvd_api_key: Option<&str>,
) -> FeedResult {
    match process_feed(descriptor, reference_time, fetcher, nvd_api_key) {
        Ok(result) => {
            info!(
                feed = %descriptor.name,
                kept = result.stats.kept,
                malformed = result.stats.malformed,
                out_of_window = result.stats.out_of_window,
                "feed done"
            );
            result
        }
        Err(err) => {
            warn!(feed = %descriptor.name, kind = err.kind(), error = %err, "feed failed");
            FeedResult::failed(descriptor, &err)
        }
    }
}

fn process_feed(
    descriptor: &FeedDescriptor,
    reference_time: DateTime<Utc>,
    fetcher: &dyn Fetch,
    nvd_api_key: Option<&str>,
) -> Result<FeedResult, FeedError> {
    let (source, body) = match &descriptor.retrieval {
        Retrieval::VulnerabilityApi {
            endpoint,
            window_days,
        } => {
            let vulns = NvdClient::new(fetcher, endpoint, nvd_api_key).fetch_recent(*window_days, reference_time)?;
            let stats = FeedStats {
                lines_read: vulns.len(),
                kept: vulns.len(),
                ..FeedStats::default()
            };
            return Ok(FeedResult::succeeded(
                descriptor,
                Some(endpoint.clone()),
                FeedEntries::Vulnerabilities(vulns),
                stats,
            ));
        }
        Retrieval::Static { url } => (url.clone(), fetcher.fetch(url)?),
        Retrieval::Dated { template } => {
            let dated = fetch_with_fallback(fetcher, template, reference_time.date_naive())?;
            (dated.url, dated.body)
        }
    };

    let parsed = match &descriptor.schema {
        Schema::Lines => {
            let parsed = parse_lines(&body);
            let stats = FeedStats {
                lines_read: parsed.lines_read,
                kept: parsed.lines.len(),
                ..FeedStats::default()
            };
            return Ok(FeedResult::succeeded(
                descriptor,
                Some(source),
                FeedEntries::Lines(parsed.lines),
                stats,
            ));
        }
        Schema::Discovered { marker } => {
            let header = locate_header(&body, marker)?;
            debug!(
                feed = %descriptor.name,
                line = header.line,
                fields = header.fields.len(),
                "located header"
            );
            if let Some(window) = descriptor.active_window() {
                if !header.fields.contains(&window.field) {
                    warn!(
                        feed = %descriptor.name,
                        field = %window.field,
                        "date field missing from discovered header; every record will be filtered out"
                    );
                }
            }
            parse_records(header.rest, &header.fields)
        }
        Schema::Fixed { fields } => parse_fixed_records(&body, fields),
        Schema::ApiNative => {
            return Err(FeedError::Decode {
                detail: format!("feed `{}` has an API-native schema but no API retrieval", descriptor.name),
            });
        }
    };

    let ParsedRecords {
        records,
        lines_read,
        malformed,
    } = parsed;

    let (records, out_of_window) = match descriptor.active_window() {
        Some(window) => apply_window(records, window, reference_time),
        None => (records, 0),
    };

    let stats = FeedStats {
        lines_read,
        malformed,
        out_of_window,
        kept: records.len(),
    };
    Ok(FeedResult::succeeded(
        descriptor,
        Some(source),
        FeedEntries::Records(records),
        stats,
    ))
}
