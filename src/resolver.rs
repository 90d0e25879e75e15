//! Concurrent resolution of a whole domain catalog.
//!
//! Each unique domain is one job, looked up once even when several categories
//! list it. Jobs run through a bounded pool; each tries the passive-DNS lookup
//! first and the system resolver second, then publishes its result into a
//! shared [`ResolutionStore`] under every category that lists the domain.

use futures::stream::{self, StreamExt};
use std::collections::{BTreeSet, HashMap};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::DomainCatalog;
use crate::dns::DnsResolver;
use crate::resolution::{Resolution, ResolutionStore};
use crate::scrape::RapidDns;
use crate::signal::ShutdownToken;

/// Default number of concurrent lookups
pub const DEFAULT_WORKERS: usize = 10;

/// Live counters for a running batch. Safe to poll from another task.
#[derive(Debug, Default)]
pub struct ResolveProgress {
    total: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl ResolveProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Jobs finished, successfully or not
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::Relaxed)
    }

    fn set_total(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
    }

    fn finish(&self, success: bool) {
        if !success {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.completed.fetch_add(1, Ordering::Relaxed);
    }
}

/// Unique domains in catalog order, each with the categories listing it.
fn domain_jobs(catalog: &DomainCatalog) -> Vec<(&str, Vec<&str>)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut jobs: Vec<(&str, Vec<&str>)> = Vec::new();
    for (category, domain) in catalog.entries() {
        let slot = *index.entry(domain).or_insert_with(|| {
            jobs.push((domain, Vec::new()));
            jobs.len() - 1
        });
        let categories = &mut jobs[slot].1;
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    jobs
}

/// Result of a single job
enum JobOutcome {
    Resolved(BTreeSet<Ipv4Addr>),
    Failed,
    Cancelled,
}

pub struct Resolver {
    scraper: RapidDns,
    dns: Option<Arc<dyn DnsResolver>>,
    workers: usize,
    token: ShutdownToken,
}

impl Resolver {
    pub fn new(scraper: RapidDns, token: ShutdownToken) -> Self {
        Self {
            scraper,
            dns: None,
            workers: DEFAULT_WORKERS,
            token,
        }
    }

    /// Enable the system DNS fallback
    pub fn with_dns(mut self, dns: Arc<dyn DnsResolver>) -> Self {
        self.dns = Some(dns);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Resolve every domain of `catalog`.
    ///
    /// Never fails: domains without any address end up in
    /// [`Resolution::failed`]. When the token is cancelled, unfinished jobs are
    /// dropped and the result is flagged as cancelled.
    pub async fn resolve_all(
        &self,
        catalog: &DomainCatalog,
        progress: &ResolveProgress,
    ) -> Resolution {
        let jobs = domain_jobs(catalog);

        progress.set_total(jobs.len());
        let store = ResolutionStore::new();
        if jobs.is_empty() {
            return store.into_resolution();
        }

        let total = jobs.len();
        let concurrency = self.workers.clamp(1, total);
        info!(
            "Resolving {} domains in {} categories with {} workers",
            total,
            catalog.category_count(),
            concurrency
        );

        stream::iter(jobs)
            .map(|(domain, categories)| {
                let store = &store;
                async move {
                    match self.resolve_one(domain).await {
                        JobOutcome::Resolved(ips) => {
                            debug!(
                                "{} [{}]: {} addresses",
                                domain,
                                categories.join(", "),
                                ips.len()
                            );
                            for category in &categories {
                                store.merge(domain, category, ips.clone());
                            }
                            progress.finish(true);
                        }
                        JobOutcome::Failed => {
                            warn!("No addresses found for {} [{}]", domain, categories.join(", "));
                            for category in &categories {
                                store.merge(domain, category, BTreeSet::new());
                            }
                            progress.finish(false);
                        }
                        JobOutcome::Cancelled => debug!("Dropped {} after cancellation", domain),
                    }
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<()>>()
            .await;

        if self.token.is_cancelled() {
            store.mark_cancelled();
        }

        let resolution = store.into_resolution();
        info!(
            "Resolved {} of {} domains, {} IPs",
            resolution.resolved_domain_count(),
            total,
            resolution.total_ips()
        );
        if !resolution.failed().is_empty() {
            warn!("{} domains could not be resolved", resolution.failed().len());
        }
        if resolution.was_cancelled() {
            warn!("Resolution was interrupted, results are partial");
        }
        resolution
    }

    async fn resolve_one(&self, domain: &str) -> JobOutcome {
        if self.token.is_cancelled() {
            return JobOutcome::Cancelled;
        }

        let Some(ips) = self.scraper.lookup(domain, &self.token).await else {
            return JobOutcome::Cancelled;
        };
        if !ips.is_empty() {
            return JobOutcome::Resolved(ips);
        }

        let Some(dns) = &self.dns else {
            return JobOutcome::Failed;
        };
        if self.token.is_cancelled() {
            return JobOutcome::Cancelled;
        }

        debug!("Falling back to system DNS for {}", domain);
        let result = dns.resolve_ipv4(domain).await;
        if self.token.is_cancelled() {
            return JobOutcome::Cancelled;
        }

        match result {
            Ok(ips) if !ips.is_empty() => JobOutcome::Resolved(ips),
            Ok(_) => JobOutcome::Failed,
            Err(e) => {
                debug!("DNS fallback failed for {}: {:#}", domain, e);
                JobOutcome::Failed
            }
        }
    }
}
