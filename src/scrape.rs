//! Passive-DNS lookups against a rapiddns.io style web service.
//!
//! The service lists historical records for a name as an HTML table. Each
//! domain is queried exactly first, and when that yields few addresses its
//! subdomains are queried as well.

use regex::Regex;
use std::collections::BTreeSet;
use std::net::Ipv4Addr;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::aggregator::parse_ipv4_set;
use crate::fetcher::{fetch_with_retry, PageFetcher, RetryPolicy};
use crate::signal::ShutdownToken;

/// Public lookup service
pub const DEFAULT_BASE_URL: &str = "https://rapiddns.io";

/// Below this many exact-match addresses the subdomain listing is queried too
pub const SUBDOMAIN_THRESHOLD: usize = 5;

fn table_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let pattern = concat!(
            r#"(?is)<table[^>]*\bclass\s*=\s*["'][^"']*\btable\b[^"']*["'][^>]*>"#,
            r"(.*?)</table>"
        );
        Regex::new(pattern).expect("valid regex")
    })
}

fn tbody_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tbody[^>]*>(.*?)</tbody>").expect("valid regex"))
}

fn row_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("valid regex"))
}

fn cell_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("valid regex"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"))
}

/// Text content of a table cell
fn cell_text(cell: &str) -> String {
    tag_regex()
        .replace_all(cell, "")
        .replace("&nbsp;", " ")
        .trim()
        .to_string()
}

/// Extract the A-record addresses from a result page.
///
/// Only the body of the first results table is read. A row counts when it has
/// at least four cells, the third is `A` and the fourth is an IPv4 address.
pub fn parse_records(html: &str) -> BTreeSet<Ipv4Addr> {
    let Some(table) = table_regex().captures(html).and_then(|c| c.get(1)) else {
        debug!("No results table in page");
        return BTreeSet::new();
    };
    let Some(tbody) = tbody_regex().captures(table.as_str()).and_then(|c| c.get(1)) else {
        return BTreeSet::new();
    };

    let values: Vec<String> = row_regex()
        .captures_iter(tbody.as_str())
        .filter_map(|row| {
            let cells: Vec<String> = cell_regex()
                .captures_iter(row.get(1)?.as_str())
                .filter_map(|c| c.get(1).map(|m| cell_text(m.as_str())))
                .collect();
            if cells.len() >= 4 && cells[2] == "A" {
                Some(cells[3].clone())
            } else {
                None
            }
        })
        .collect();

    parse_ipv4_set(values.iter().map(String::as_str))
}

/// Lookup client for one passive-DNS service.
pub struct RapidDns {
    base_url: String,
    subdomain_threshold: usize,
    fetcher: Arc<dyn PageFetcher>,
    policy: RetryPolicy,
}

impl RapidDns {
    pub fn new(base_url: &str, fetcher: Arc<dyn PageFetcher>, policy: RetryPolicy) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            subdomain_threshold: SUBDOMAIN_THRESHOLD,
            fetcher,
            policy,
        }
    }

    pub fn with_subdomain_threshold(mut self, threshold: usize) -> Self {
        self.subdomain_threshold = threshold;
        self
    }

    pub fn exact_url(&self, domain: &str) -> String {
        format!("{}/s/{}?full=1", self.base_url, domain)
    }

    pub fn subdomain_url(&self, domain: &str) -> String {
        format!("{}/subdomain/{}?full=1", self.base_url, domain)
    }

    /// Query one page. Exhausted retries contribute no addresses.
    async fn query(&self, url: &str, token: &ShutdownToken) -> BTreeSet<Ipv4Addr> {
        match fetch_with_retry(self.fetcher.as_ref(), url, &self.policy, token).await {
            Ok(html) => parse_records(&html),
            Err(e) => {
                if !token.is_cancelled() {
                    warn!("Giving up on {}: {:#}", url, e);
                }
                BTreeSet::new()
            }
        }
    }

    /// Addresses known for `domain`, or `None` when cancelled mid-lookup.
    pub async fn lookup(&self, domain: &str, token: &ShutdownToken) -> Option<BTreeSet<Ipv4Addr>> {
        let mut ips = self.query(&self.exact_url(domain), token).await;
        if token.is_cancelled() {
            return None;
        }
        debug!("{}: {} addresses from exact lookup", domain, ips.len());

        if ips.len() < self.subdomain_threshold {
            let subdomain_ips = self.query(&self.subdomain_url(domain), token).await;
            if token.is_cancelled() {
                return None;
            }
            debug!("{}: {} addresses from subdomain lookup", domain, subdomain_ips.len());
            ips.extend(subdomain_ips);
        }

        Some(ips)
    }
}
