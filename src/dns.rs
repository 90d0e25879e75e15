//! System DNS fallback for domains the lookup service knows nothing about.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Default DNS resolution timeout in seconds
pub const DNS_TIMEOUT_SECS: u64 = 5;

/// Forward resolution of a name to its IPv4 addresses.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve_ipv4(&self, domain: &str) -> Result<BTreeSet<Ipv4Addr>>;
}

/// The host's resolver (getaddrinfo) run on the blocking pool.
#[derive(Debug, Clone)]
pub struct SystemDns {
    timeout: Duration,
}

impl SystemDns {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemDns {
    fn default() -> Self {
        Self::new(Duration::from_secs(DNS_TIMEOUT_SECS))
    }
}

/// Keep the IPv4 answers of a lookup
fn ipv4_only(addrs: impl IntoIterator<Item = IpAddr>) -> BTreeSet<Ipv4Addr> {
    addrs
        .into_iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .collect()
}

#[async_trait]
impl DnsResolver for SystemDns {
    async fn resolve_ipv4(&self, domain: &str) -> Result<BTreeSet<Ipv4Addr>> {
        let name = domain.to_string();
        let dns_future = tokio::task::spawn_blocking(move || dns_lookup::lookup_host(&name));

        let addrs = tokio::time::timeout(self.timeout, dns_future)
            .await
            .with_context(|| format!("DNS timeout for {}", domain))?
            .context("DNS task failed")?
            .with_context(|| format!("DNS lookup failed for {}", domain))?;

        Ok(ipv4_only(addrs))
    }
}
