//! NVD CVE API 2.0 integration.
//!
//! Queries vulnerabilities published in a trailing window and maps each one to
//! `(id, first English description, detail-page link)`. Every way the API can
//! let us down (transport, rate limiting, unexpected JSON) is reported as
//! `FeedError::AdapterTransient`; the caller always gets either a complete list
//! or an error, never a half-filled result.

use chrono::{DateTime, Duration, Utc};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info};

use crate::data::http::Fetch;
use crate::domain::Vulnerability;
use crate::error::FeedError;

const DETAIL_URL: &str = "https://nvd.nist.gov/vuln/detail/";
const PAGE_SIZE: usize = 2000;
const API_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

pub struct NvdClient<'a> {
    fetcher: &'a dyn Fetch,
    endpoint: &'a str,
    api_key: Option<&'a str>,
}

impl<'a> NvdClient<'a> {
    pub fn new(fetcher: &'a dyn Fetch, endpoint: &'a str, api_key: Option<&'a str>) -> Self {
        Self {
            fetcher,
            endpoint,
            api_key,
        }
    }

    /// Vulnerabilities published in `[reference_time - window_days, reference_time]`.
    pub fn fetch_recent(
        &self,
        window_days: u32,
        reference_time: DateTime<Utc>,
    ) -> Result<Vec<Vulnerability>, FeedError> {
        let start = reference_time - Duration::days(i64::from(window_days));

        let mut out = Vec::new();
        let mut start_index = 0usize;
        loop {
            let url = query_url(self.endpoint, start, reference_time, start_index)?;
            let page = self.fetch_page(&url)?;
            let received = page.vulnerabilities.len();
            debug!(start_index, received, total = page.total_results, "NVD page");

            out.extend(page.vulnerabilities.into_iter().map(|item| to_vulnerability(item.cve)));

            start_index += received;
            if received == 0 || start_index >= page.total_results {
                break;
            }
        }

        info!(count = out.len(), window_days, "fetched recent vulnerabilities");
        Ok(out)
    }

    fn fetch_page(&self, url: &str) -> Result<CveResponse, FeedError> {
        let body = match self.api_key {
            Some(key) => self.fetcher.fetch_with_headers(url, &[("apiKey", key)]),
            None => self.fetcher.fetch(url),
        }
        .map_err(|e| FeedError::AdapterTransient {
            detail: e.to_string(),
        })?;
        parse_page(&body)
    }
}

/// Build the paged query URL for a publication-date window.
pub fn query_url(
    endpoint: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    start_index: usize,
) -> Result<String, FeedError> {
    let start = start.format(API_DATE_FORMAT).to_string();
    let end = end.format(API_DATE_FORMAT).to_string();
    let page_size = PAGE_SIZE.to_string();
    let start_index = start_index.to_string();

    Url::parse_with_params(
        endpoint,
        &[
            ("pubStartDate", start.as_str()),
            ("pubEndDate", end.as_str()),
            ("resultsPerPage", page_size.as_str()),
            ("startIndex", start_index.as_str()),
        ],
    )
    .map(String::from)
    .map_err(|e| FeedError::AdapterTransient {
        detail: format!("invalid API endpoint '{endpoint}': {e}"),
    })
}

pub fn detail_link(id: &str) -> String {
    format!("{DETAIL_URL}{id}")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CveResponse {
    #[serde(default)]
    total_results: usize,
    #[serde(default)]
    vulnerabilities: Vec<CveItem>,
}

#[derive(Debug, Deserialize)]
struct CveItem {
    cve: Cve,
}

#[derive(Debug, Deserialize)]
struct Cve {
    id: String,
    #[serde(default)]
    descriptions: Vec<Description>,
}

#[derive(Debug, Deserialize)]
struct Description {
    lang: String,
    value: String,
}

fn parse_page(body: &str) -> Result<CveResponse, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::AdapterTransient {
        detail: format!("unexpected NVD response: {e}"),
    })
}

fn to_vulnerability(cve: Cve) -> Vulnerability {
    let description = cve
        .descriptions
        .into_iter()
        .find(|d| d.lang.eq_ignore_ascii_case("en"))
        .map(|d| d.value)
        .unwrap_or_default();
    Vulnerability {
        link: detail_link(&cve.id),
        id: cve.id,
        description,
    }
}
