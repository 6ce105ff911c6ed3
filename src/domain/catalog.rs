//! Built-in feed catalog.

use tracing::warn;

use crate::domain::{DateWindow, FeedDescriptor, Retrieval, Schema};

pub const SSL_BLACKLIST: &str = "ssl_blacklist";
pub const MALWARE_URLS: &str = "malware_urls";
pub const KNOWN_EXPLOITED: &str = "known_exploited";
pub const C2_INDICATORS: &str = "c2_indicators";
pub const IP_BLOCKLIST: &str = "ip_blocklist";
pub const VULNERABILITIES: &str = "vulnerabilities";

const SSL_BLACKLIST_URL: &str = "https://sslbl.abuse.ch/blacklist/sslipblacklist_aggressive.csv";
const MALWARE_URLS_URL: &str = "https://urlhaus.abuse.ch/downloads/csv_recent/";
const KNOWN_EXPLOITED_URL: &str =
    "https://www.cisa.gov/sites/default/files/csv/known_exploited_vulnerabilities.csv";
const IP_BLOCKLIST_URL: &str = "https://feodotracker.abuse.ch/downloads/ipblocklist.txt";
pub const NVD_ENDPOINT: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const RECENT_DAYS: u32 = 7;

/// The default feed set.
///
/// The command-and-control feed has no well-known public location, so it is only
/// included when a URL template is configured.
pub fn builtin_feeds(c2_url_template: Option<&str>) -> Vec<FeedDescriptor> {
    let mut feeds = vec![
        FeedDescriptor {
            name: SSL_BLACKLIST.to_string(),
            title: "SSL IP Blacklist".to_string(),
            retrieval: Retrieval::Static {
                url: SSL_BLACKLIST_URL.to_string(),
            },
            schema: Schema::Discovered {
                marker: "Firstseen,DstIP,DstPort".to_string(),
            },
            window: Some(DateWindow {
                field: "Firstseen".to_string(),
                format: DATETIME_FORMAT.to_string(),
                days: RECENT_DAYS,
            }),
        },
        FeedDescriptor {
            name: MALWARE_URLS.to_string(),
            title: "Malware URLs".to_string(),
            retrieval: Retrieval::Static {
                url: MALWARE_URLS_URL.to_string(),
            },
            schema: Schema::Discovered {
                marker: "id,dateadded,url,url_status,last_online,threat,tags,urlhaus_link,reporter"
                    .to_string(),
            },
            window: Some(DateWindow {
                field: "dateadded".to_string(),
                format: DATETIME_FORMAT.to_string(),
                days: RECENT_DAYS,
            }),
        },
        FeedDescriptor {
            name: KNOWN_EXPLOITED.to_string(),
            title: "Known Exploited Vulnerabilities".to_string(),
            retrieval: Retrieval::Static {
                url: KNOWN_EXPLOITED_URL.to_string(),
            },
            schema: Schema::Discovered {
                marker: "cveID,vendorProject,product,vulnerabilityName,dateAdded,shortDescription,requiredAction,dueDate,knownRansomwareCampaignUse,notes"
                    .to_string(),
            },
            window: Some(DateWindow {
                field: "dateAdded".to_string(),
                format: DATE_FORMAT.to_string(),
                days: RECENT_DAYS,
            }),
        },
    ];

    match c2_url_template {
        Some(template) => feeds.push(FeedDescriptor {
            name: C2_INDICATORS.to_string(),
            title: "Command-and-Control Indicators".to_string(),
            retrieval: Retrieval::Dated {
                template: template.to_string(),
            },
            schema: Schema::Lines,
            window: None,
        }),
        None => warn!(
            feed = C2_INDICATORS,
            "no C2 URL template configured (THREAT_DIGEST_C2_URL_TEMPLATE); skipping feed"
        ),
    }

    feeds.push(FeedDescriptor {
        name: IP_BLOCKLIST.to_string(),
        title: "IP Blocklist".to_string(),
        retrieval: Retrieval::Static {
            url: IP_BLOCKLIST_URL.to_string(),
        },
        schema: Schema::Lines,
        window: None,
    });

    feeds.push(FeedDescriptor {
        name: VULNERABILITIES.to_string(),
        title: "New Vulnerabilities".to_string(),
        retrieval: Retrieval::VulnerabilityApi {
            endpoint: NVD_ENDPOINT.to_string(),
            window_days: 1,
        },
        schema: Schema::ApiNative,
        window: None,
    });

    feeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::validate_descriptors;

    #[test]
    fn catalog_is_valid_with_and_without_c2() {
        let without = builtin_feeds(None);
        assert!(validate_descriptors(&without).is_ok());
        assert!(without.iter().all(|d| d.name != C2_INDICATORS));

        let with = builtin_feeds(Some("https://c2.test/{month}/Feed-{date}.txt"));
        assert!(validate_descriptors(&with).is_ok());
        assert_eq!(with.len(), without.len() + 1);
    }

    #[test]
    fn csv_feeds_filter_on_a_seven_day_window() {
        for d in builtin_feeds(None) {
            if matches!(d.schema, Schema::Discovered { .. }) {
                let window = d.active_window().unwrap();
                assert_eq!(window.days, 7, "feed {}", d.name);
            } else {
                assert!(d.active_window().is_none(), "feed {}", d.name);
            }
        }
    }
}
