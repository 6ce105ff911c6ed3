//! Shared domain types.
//!
//! Descriptors are built once at startup and never mutated. Everything produced
//! by a run (`Record`, `FeedResult`, `FeedResults`) is created inside that run and
//! handed, read-only, to whatever renders it. The output types serialize to JSON
//! so the hand-off can also happen through a file.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::{AppError, FeedError};

/// How a feed's payload is retrieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// One GET against a fixed URL.
    Static { url: String },
    /// A file published per day. `template` contains `{month}` (`YYYY-MM`) and
    /// `{date}` (`YYYY-MM-DD`) placeholders; a 404 falls back to the previous day once.
    Dated { template: String },
    /// The NVD CVE API, queried for entries published in the trailing window.
    VulnerabilityApi { endpoint: String, window_days: u32 },
}

impl Retrieval {
    pub fn describe(&self) -> String {
        match self {
            Retrieval::Static { url } => format!("static {url}"),
            Retrieval::Dated { template } => format!("dated {template} (1-day fallback)"),
            Retrieval::VulnerabilityApi {
                endpoint,
                window_days,
            } => format!("api {endpoint} (last {window_days}d)"),
        }
    }
}

/// How a feed's payload is turned into entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    /// CSV whose header line is found by searching for `marker`.
    Discovered { marker: String },
    /// CSV with a schema declared up front.
    Fixed { fields: Vec<String> },
    /// One indicator per line.
    Lines,
    /// Entries come pre-structured from the vulnerability API.
    ApiNative,
}

impl Schema {
    pub fn describe(&self) -> String {
        match self {
            Schema::Discovered { marker } => format!("csv, header `{marker}`"),
            Schema::Fixed { fields } => format!("csv, fixed [{}]", fields.join(",")),
            Schema::Lines => "line list".to_string(),
            Schema::ApiNative => "api-native".to_string(),
        }
    }

    fn yields_records(&self) -> bool {
        matches!(self, Schema::Discovered { .. } | Schema::Fixed { .. })
    }
}

/// Trailing date window applied to a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub field: String,
    /// chrono format string, e.g. `%Y-%m-%d %H:%M:%S`.
    pub format: String,
    /// Window length in days. `0` disables filtering.
    pub days: u32,
}

/// Immutable per-feed configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDescriptor {
    pub name: String,
    pub title: String,
    pub retrieval: Retrieval,
    pub schema: Schema,
    pub window: Option<DateWindow>,
}

impl FeedDescriptor {
    /// The window to apply, if any (a zero-day window means "no filtering").
    pub fn active_window(&self) -> Option<&DateWindow> {
        self.window.as_ref().filter(|w| w.days > 0)
    }

    /// Check that the strategy combination makes sense.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("feed name must not be empty".to_string());
        }

        let is_api = matches!(self.retrieval, Retrieval::VulnerabilityApi { .. });
        let is_api_native = matches!(self.schema, Schema::ApiNative);
        if is_api != is_api_native {
            return Err(format!(
                "feed `{}`: API retrieval and API-native schema must be used together",
                self.name
            ));
        }

        if let Retrieval::Dated { template } = &self.retrieval {
            if !template.contains("{date}") {
                return Err(format!(
                    "feed `{}`: dated URL template must contain `{{date}}`",
                    self.name
                ));
            }
        }

        if let Schema::Discovered { marker } = &self.schema {
            if marker.trim().is_empty() {
                return Err(format!("feed `{}`: header marker must not be empty", self.name));
            }
        }
        if let Schema::Fixed { fields } = &self.schema {
            if fields.is_empty() {
                return Err(format!("feed `{}`: fixed schema needs at least one field", self.name));
            }
        }

        if let Some(window) = self.active_window() {
            if !self.schema.yields_records() {
                return Err(format!(
                    "feed `{}`: a date window needs a CSV schema",
                    self.name
                ));
            }
            if let Schema::Fixed { fields } = &self.schema {
                if !fields.iter().any(|f| f == &window.field) {
                    return Err(format!(
                        "feed `{}`: date field `{}` is not part of the schema",
                        self.name, window.field
                    ));
                }
            }
        }

        Ok(())
    }
}

/// Validate a whole descriptor set: each descriptor plus name uniqueness.
pub fn validate_descriptors(descriptors: &[FeedDescriptor]) -> Result<(), AppError> {
    let mut seen = std::collections::HashSet::new();
    for d in descriptors {
        d.validate().map_err(AppError::usage)?;
        if !seen.insert(d.name.as_str()) {
            return Err(AppError::usage(format!("duplicate feed name `{}`", d.name)));
        }
    }
    Ok(())
}

/// One parsed CSV row: field name → value, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A recently published vulnerability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vulnerability {
    pub id: String,
    /// First English description, or empty.
    pub description: String,
    pub link: String,
}

/// A feed's entries, shaped by its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum FeedEntries {
    Records(Vec<Record>),
    Lines(Vec<String>),
    Vulnerabilities(Vec<Vulnerability>),
}

impl FeedEntries {
    /// The empty collection matching a schema.
    pub fn empty_for(schema: &Schema) -> Self {
        match schema {
            Schema::Discovered { .. } | Schema::Fixed { .. } => FeedEntries::Records(Vec::new()),
            Schema::Lines => FeedEntries::Lines(Vec::new()),
            Schema::ApiNative => FeedEntries::Vulnerabilities(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeedEntries::Records(v) => v.len(),
            FeedEntries::Lines(v) => v.len(),
            FeedEntries::Vulnerabilities(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Why a feed produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedFailure {
    pub kind: &'static str,
    pub detail: String,
}

impl From<&FeedError> for FeedFailure {
    fn from(err: &FeedError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

/// Row accounting for one feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Non-blank data lines seen after the header.
    pub lines_read: usize,
    /// Lines dropped because they did not fit the schema.
    pub malformed: usize,
    /// Records dropped by the date window (including unparseable dates).
    pub out_of_window: usize,
    pub kept: usize,
}

/// Outcome of one feed's pipeline.
///
/// `failure` is authoritative: an empty `entries` with no failure just means the
/// feed had nothing recent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedResult {
    pub name: String,
    pub title: String,
    /// URL actually fetched (after any dated fallback).
    pub source: Option<String>,
    pub entries: FeedEntries,
    pub stats: FeedStats,
    pub failure: Option<FeedFailure>,
}

impl FeedResult {
    pub fn succeeded(
        descriptor: &FeedDescriptor,
        source: Option<String>,
        entries: FeedEntries,
        stats: FeedStats,
    ) -> Self {
        Self {
            name: descriptor.name.clone(),
            title: descriptor.title.clone(),
            source,
            entries,
            stats,
            failure: None,
        }
    }

    pub fn failed(descriptor: &FeedDescriptor, err: &FeedError) -> Self {
        Self {
            name: descriptor.name.clone(),
            title: descriptor.title.clone(),
            source: None,
            entries: FeedEntries::empty_for(&descriptor.schema),
            stats: FeedStats::default(),
            failure: Some(FeedFailure::from(err)),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Everything one run produced, keyed by feed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedResults {
    pub reference_time: DateTime<Utc>,
    pub feeds: BTreeMap<String, FeedResult>,
}

impl FeedResults {
    pub fn get(&self, name: &str) -> Option<&FeedResult> {
        self.feeds.get(name)
    }

    pub fn failed(&self) -> impl Iterator<Item = &FeedResult> {
        self.feeds.values().filter(|r| r.is_failed())
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Resolved settings for one run (CLI flags merged over environment).
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub reference_time: DateTime<Utc>,
    /// Restrict the run to these feed names (empty = all).
    pub only_feeds: Vec<String>,
    pub timeout: Duration,
    pub parallel: bool,
    pub export: Option<PathBuf>,
    /// Entries printed per feed in the terminal summary.
    pub show: usize,
    pub strict: bool,
    pub nvd_api_key: Option<String>,
    pub c2_url_template: Option<String>,
}
