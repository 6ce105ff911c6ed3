//! Formatted terminal output.
//!
//! We keep formatting code in one place so the pipeline stays free of
//! presentation concerns and output changes are localized.

use crate::domain::{FeedDescriptor, FeedEntries, FeedResult, FeedResults};

const PREVIEW_WIDTH: usize = 100;

/// Format the per-feed summary of a run.
pub fn format_run_summary(results: &FeedResults, show: usize) -> String {
    let mut out = String::new();

    out.push_str("=== threat-digest ===\n");
    out.push_str(&format!(
        "Reference: {}\n",
        results.reference_time.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    out.push_str(&format!(
        "Feeds: {} ({} failed)\n",
        results.feeds.len(),
        results.failed_count()
    ));

    for result in results.feeds.values() {
        out.push('\n');
        out.push_str(&format_feed(result, show));
    }

    out
}

fn format_feed(result: &FeedResult, show: usize) -> String {
    let mut out = String::new();

    match &result.failure {
        Some(failure) => {
            out.push_str(&format!("[FAILED] {} ({})\n", result.title, result.name));
            out.push_str(&format!("  {}: {}\n", failure.kind, failure.detail));
            return out;
        }
        None => out.push_str(&format!("[ok] {} ({})\n", result.title, result.name)),
    }

    if let Some(source) = &result.source {
        out.push_str(&format!("  source: {source}\n"));
    }
    let s = &result.stats;
    out.push_str(&format!(
        "  kept={} read={} malformed={} out_of_window={}\n",
        s.kept, s.lines_read, s.malformed, s.out_of_window
    ));

    let previews = preview_entries(&result.entries, show);
    for line in &previews {
        out.push_str(&format!("  - {line}\n"));
    }
    let hidden = result.entries.len().saturating_sub(previews.len());
    if hidden > 0 {
        out.push_str(&format!("  ... and {hidden} more\n"));
    }

    out
}

fn preview_entries(entries: &FeedEntries, show: usize) -> Vec<String> {
    match entries {
        FeedEntries::Records(records) => records
            .iter()
            .take(show)
            .map(|r| {
                let values: Vec<&str> = r.iter().map(|(_, v)| v).collect();
                truncate(&values.join(" | "), PREVIEW_WIDTH)
            })
            .collect(),
        FeedEntries::Lines(lines) => lines
            .iter()
            .take(show)
            .map(|l| truncate(l, PREVIEW_WIDTH))
            .collect(),
        FeedEntries::Vulnerabilities(vulns) => vulns
            .iter()
            .take(show)
            .map(|v| truncate(&format!("{} {}", v.id, v.description), PREVIEW_WIDTH))
            .collect(),
    }
}

/// Format the feed catalog as a table.
pub fn format_catalog(feeds: &[FeedDescriptor]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<18} {:<8} {}\n", "name", "window", "retrieval / schema").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<18} {:-<8} {:-<40}\n", "", "", "").trim_end());
    out.push('\n');

    for d in feeds {
        let window = match d.active_window() {
            Some(w) => format!("{}d", w.days),
            None => "-".to_string(),
        };
        out.push_str(&format!(
            "{:<18} {:<8} {}\n",
            truncate(&d.name, 18),
            window,
            d.retrieval.describe()
        ));
        out.push_str(&format!("{:<18} {:<8} {}\n", "", "", truncate(&d.schema.describe(), PREVIEW_WIDTH)));
    }

    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::builtin_feeds;
    use crate::domain::{FeedStats, Record, Retrieval, Schema};
    use crate::error::FeedError;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn descriptor(name: &str, schema: Schema) -> FeedDescriptor {
        FeedDescriptor {
            name: name.to_string(),
            title: name.to_uppercase(),
            retrieval: Retrieval::Static {
                url: format!("https://feeds.test/{name}"),
            },
            schema,
            window: None,
        }
    }

    #[test]
    fn summary_shows_failures_and_previews() {
        let ok_feed = descriptor("lines", Schema::Lines);
        let bad_feed = descriptor("csv", Schema::Fixed { fields: vec!["a".to_string()] });

        let ok = FeedResult::succeeded(
            &ok_feed,
            Some("https://feeds.test/lines".to_string()),
            FeedEntries::Lines(vec!["1.1.1.1".to_string(), "2.2.2.2".to_string(), "3.3.3.3".to_string()]),
            FeedStats {
                lines_read: 3,
                kept: 3,
                ..FeedStats::default()
            },
        );
        let bad = FeedResult::failed(
            &bad_feed,
            &FeedError::HttpStatus {
                url: "https://feeds.test/csv".to_string(),
                status: 500,
            },
        );

        let mut feeds = BTreeMap::new();
        feeds.insert(ok.name.clone(), ok);
        feeds.insert(bad.name.clone(), bad);
        let results = FeedResults {
            reference_time: Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap(),
            feeds,
        };

        let text = format_run_summary(&results, 2);
        assert!(text.contains("Feeds: 2 (1 failed)"));
        assert!(text.contains("[FAILED] CSV (csv)"));
        assert!(text.contains("http_status"));
        assert!(text.contains("  - 1.1.1.1"));
        assert!(!text.contains("3.3.3.3"));
        assert!(text.contains("... and 1 more"));
    }

    #[test]
    fn record_preview_joins_values_in_order() {
        let entries = FeedEntries::Records(vec![Record::new(vec![
            ("Firstseen".to_string(), "2024-01-01 00:00:00".to_string()),
            ("DstIP".to_string(), "1.2.3.4".to_string()),
        ])]);
        assert_eq!(preview_entries(&entries, 5), vec!["2024-01-01 00:00:00 | 1.2.3.4"]);
    }

    #[test]
    fn catalog_lists_every_feed() {
        let feeds = builtin_feeds(None);
        let text = format_catalog(&feeds);
        for d in &feeds {
            assert!(text.contains(&d.name), "missing {}", d.name);
        }
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
    }
}
