//! Resolved addresses per category and domain.
//!
//! Workers publish into a [`ResolutionStore`] through [`ResolutionStore::merge`],
//! the single mutation entry point. The store only ever inserts, so the order
//! in which workers finish does not change the final [`Resolution`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;
use std::sync::Mutex;

use crate::aggregator::parse_ipv4_set;

/// Addresses of one category: the union plus each domain's own set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryIps {
    ips: BTreeSet<Ipv4Addr>,
    domains: BTreeMap<String, BTreeSet<Ipv4Addr>>,
}

impl CategoryIps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a domain's addresses. Repeated calls for a domain union its sets.
    pub fn insert(&mut self, domain: &str, ips: impl IntoIterator<Item = Ipv4Addr>) {
        let entry = self.domains.entry(domain.to_string()).or_default();
        for ip in ips {
            entry.insert(ip);
            self.ips.insert(ip);
        }
    }

    /// Union of every domain's addresses.
    pub fn ips(&self) -> &BTreeSet<Ipv4Addr> {
        &self.ips
    }

    pub fn domains(&self) -> &BTreeMap<String, BTreeSet<Ipv4Addr>> {
        &self.domains
    }

    /// First domain (in name order) that resolved to `ip`.
    pub fn owner_of(&self, ip: Ipv4Addr) -> Option<&str> {
        self.domains
            .iter()
            .find(|(_, ips)| ips.contains(&ip))
            .map(|(domain, _)| domain.as_str())
    }

    pub fn len(&self) -> usize {
        self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ips.is_empty()
    }
}

/// Outcome of resolving a whole catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    categories: BTreeMap<String, CategoryIps>,
    failed: BTreeSet<String>,
    cancelled: bool,
}

impl Resolution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn categories(&self) -> &BTreeMap<String, CategoryIps> {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategoryIps> {
        self.categories.get(name)
    }

    /// Domains that produced no address through any lookup path.
    pub fn failed(&self) -> &BTreeSet<String> {
        &self.failed
    }

    /// Whether the batch was interrupted before every domain finished.
    pub fn was_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Distinct addresses across all categories.
    pub fn total_ips(&self) -> usize {
        self.categories
            .values()
            .flat_map(|c| c.ips().iter())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Distinct domains with at least one address.
    pub fn resolved_domain_count(&self) -> usize {
        self.categories
            .values()
            .flat_map(|c| c.domains().keys())
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Record addresses for a domain in a category. Empty sets are ignored.
    pub fn insert(&mut self, category: &str, domain: &str, ips: BTreeSet<Ipv4Addr>) {
        if ips.is_empty() {
            return;
        }
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(domain, ips);
    }

    pub fn mark_failed(&mut self, domain: &str) {
        self.failed.insert(domain.to_string());
    }

    /// Serialize as a resolved-set file.
    pub fn to_json(&self) -> Result<String> {
        let file = ResolutionFile {
            categories: self
                .categories
                .iter()
                .map(|(category, ips)| {
                    let domains = ips
                        .domains()
                        .iter()
                        .map(|(domain, set)| {
                            (domain.clone(), set.iter().map(ToString::to_string).collect())
                        })
                        .collect();
                    (category.clone(), domains)
                })
                .collect(),
            failed: self.failed.iter().cloned().collect(),
        };
        serde_json::to_string_pretty(&file).context("Failed to serialize resolved set")
    }

    /// Load a resolved-set file. Malformed addresses are dropped.
    pub fn from_json(content: &str) -> Result<Self> {
        let file: ResolutionFile =
            serde_json::from_str(content).context("Failed to parse resolved set")?;

        let mut resolution = Self::new();
        for (category, domains) in &file.categories {
            for (domain, ips) in domains {
                let ips = parse_ipv4_set(ips.iter().map(String::as_str));
                resolution.insert(category, domain, ips);
            }
        }
        for domain in &file.failed {
            resolution.mark_failed(domain);
        }
        Ok(resolution)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ResolutionFile {
    #[serde(default)]
    categories: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    failed: Vec<String>,
}

/// Concurrent accumulator the resolver's workers publish into.
#[derive(Debug, Default)]
pub struct ResolutionStore {
    inner: Mutex<Resolution>,
}

impl ResolutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish one domain's complete result.
    pub fn merge(&self, domain: &str, category: &str, ips: BTreeSet<Ipv4Addr>) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if ips.is_empty() {
            guard.mark_failed(domain);
        } else {
            guard.insert(category, domain, ips);
        }
    }

    pub(crate) fn mark_cancelled(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.cancelled = true;
    }

    pub fn into_resolution(self) -> Resolution {
        self.inner.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}
