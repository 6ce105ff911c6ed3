//! Per-day feed files.
//!
//! Some publishers drop a new file every day under a month directory, e.g.
//! `.../2024-01/Feed-2024-01-31.txt`. Today's file may not exist yet early in
//! the day, so a 404 falls back to yesterday's file exactly once.

use chrono::NaiveDate;
use tracing::info;

use crate::data::http::Fetch;
use crate::error::FeedError;

/// Placeholder for the `YYYY-MM` component.
pub const MONTH_PLACEHOLDER: &str = "{month}";
/// Placeholder for the `YYYY-MM-DD` component.
pub const DATE_PLACEHOLDER: &str = "{date}";

/// Body of a dated feed and which day's file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedBody {
    pub date: NaiveDate,
    pub url: String,
    pub body: String,
}

/// Fill a URL template for `date`.
pub fn resolve(template: &str, date: NaiveDate) -> String {
    template
        .replace(MONTH_PLACEHOLDER, &date.format("%Y-%m").to_string())
        .replace(DATE_PLACEHOLDER, &date.format("%Y-%m-%d").to_string())
}

/// Fetch the file for `date`, or the previous day's file if that one is a 404.
///
/// Any other failure, and any failure of the fallback request, is returned as is.
pub fn fetch_with_fallback(
    fetcher: &dyn Fetch,
    template: &str,
    date: NaiveDate,
) -> Result<DatedBody, FeedError> {
    let url = resolve(template, date);
    match fetcher.fetch(&url) {
        Ok(body) => Ok(DatedBody { date, url, body }),
        Err(err) if err.is_not_found() => {
            let Some(previous) = date.pred_opt() else {
                return Err(err);
            };
            let fallback = resolve(template, previous);
            info!(%url, %fallback, "dated feed not published yet; trying previous day");
            let body = fetcher.fetch(&fallback)?;
            Ok(DatedBody {
                date: previous,
                url: fallback,
                body,
            })
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::http::testing::MockFetcher;

    const TEMPLATE: &str = "https://c2.test/{month}/Feed-{date}.txt";

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn resolve_fills_month_and_date() {
        assert_eq!(
            resolve(TEMPLATE, day(2024, 3, 5)),
            "https://c2.test/2024-03/Feed-2024-03-05.txt"
        );
    }

    #[test]
    fn primary_url_is_used_when_available() {
        let fetcher = MockFetcher::new().with_body("https://c2.test/2024-03/Feed-2024-03-05.txt", "1.2.3.4\n");

        let got = fetch_with_fallback(&fetcher, TEMPLATE, day(2024, 3, 5)).unwrap();
        assert_eq!(got.date, day(2024, 3, 5));
        assert_eq!(got.body, "1.2.3.4\n");
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn not_found_falls_back_to_previous_day_across_month_boundary() {
        let fetcher = MockFetcher::new()
            .with_status("https://c2.test/2024-03/Feed-2024-03-01.txt", 404)
            .with_body("https://c2.test/2024-02/Feed-2024-02-29.txt", "5.6.7.8\n");

        let got = fetch_with_fallback(&fetcher, TEMPLATE, day(2024, 3, 1)).unwrap();
        assert_eq!(got.date, day(2024, 2, 29));
        assert_eq!(got.url, "https://c2.test/2024-02/Feed-2024-02-29.txt");
        assert_eq!(got.body, "5.6.7.8\n");
    }

    #[test]
    fn other_status_does_not_fall_back() {
        let fetcher = MockFetcher::new()
            .with_status("https://c2.test/2024-03/Feed-2024-03-05.txt", 500)
            .with_body("https://c2.test/2024-03/Feed-2024-03-04.txt", "unused\n");

        let err = fetch_with_fallback(&fetcher, TEMPLATE, day(2024, 3, 5)).unwrap_err();
        assert_eq!(
            err,
            FeedError::HttpStatus {
                url: "https://c2.test/2024-03/Feed-2024-03-05.txt".to_string(),
                status: 500,
            }
        );
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn fallback_is_attempted_only_once() {
        // Neither day exists: the second 404 is surfaced, no third request.
        let fetcher = MockFetcher::new();

        let err = fetch_with_fallback(&fetcher, TEMPLATE, day(2024, 3, 5)).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(
            fetcher.requests(),
            vec![
                "https://c2.test/2024-03/Feed-2024-03-05.txt".to_string(),
                "https://c2.test/2024-03/Feed-2024-03-04.txt".to_string(),
            ]
        );
    }
}
