//! Configuration management for Routerus.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dns::DNS_TIMEOUT_SECS;
use crate::fetcher::{RetryPolicy, DEFAULT_USER_AGENT, TIMEOUT_SECS};
use crate::formats::parse_formats;
use crate::resolver::DEFAULT_WORKERS;
use crate::scrape::{DEFAULT_BASE_URL, SUBDOMAIN_THRESHOLD};

/// Upper bound for any configured delay, in seconds
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Categorized domain list
    pub input_file: Option<PathBuf>,

    /// Root directory for generated files
    pub output_dir: PathBuf,

    /// Formats to generate (empty means all)
    pub formats: Vec<String>,

    /// Concurrent domain lookups
    pub workers: usize,

    /// Write summary.json next to the generated files
    pub write_summary: bool,

    /// Passive-DNS lookup service
    pub lookup: LookupConfig,

    /// System DNS fallback
    pub dns: DnsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_file: None,
            output_dir: PathBuf::from("routes"),
            formats: Vec::new(),
            workers: DEFAULT_WORKERS,
            write_summary: true,
            lookup: LookupConfig::default(),
            dns: DnsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be at least 1");
        }

        parse_formats(&self.formats)?;

        if !self.lookup.base_url.starts_with("https://") {
            anyhow::bail!("Lookup base_url must use HTTPS: {}", self.lookup.base_url);
        }

        if self.lookup.user_agent.trim().is_empty() {
            anyhow::bail!("Lookup user_agent must not be empty");
        }

        if self.lookup.timeout_secs == 0 {
            anyhow::bail!("Lookup timeout_secs must be at least 1");
        }

        if self.lookup.max_attempts == 0 {
            anyhow::bail!("Lookup max_attempts must be at least 1");
        }

        let delays = [
            ("delay_min", self.lookup.delay_min),
            ("delay_max", self.lookup.delay_max),
            ("backoff_base", self.lookup.backoff_base),
            ("jitter", self.lookup.jitter),
        ];
        for (name, value) in delays {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!(
                    "Lookup {} must be a non-negative number of seconds: {}",
                    name,
                    value
                );
            }
            if value > MAX_DELAY_SECS {
                anyhow::bail!(
                    "Lookup {} must not exceed {} seconds: {}",
                    name,
                    MAX_DELAY_SECS,
                    value
                );
            }
        }

        if self.lookup.delay_min > self.lookup.delay_max {
            anyhow::bail!(
                "Lookup delay_min ({}) must not exceed delay_max ({})",
                self.lookup.delay_min,
                self.lookup.delay_max
            );
        }

        if self.dns.enabled && self.dns.timeout_secs == 0 {
            anyhow::bail!("DNS timeout_secs must be at least 1");
        }

        Ok(())
    }

    /// Retry timing for the lookup service
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.lookup.max_attempts,
            delay_min: delay(self.lookup.delay_min),
            delay_max: delay(self.lookup.delay_max),
            backoff_base: delay(self.lookup.backoff_base),
            jitter: delay(self.lookup.jitter),
        }
    }
}

/// Seconds to a `Duration`, clamped to `0..=MAX_DELAY_SECS`. NaN maps to zero.
fn delay(seconds: f64) -> Duration {
    Duration::try_from_secs_f64(seconds.clamp(0.0, MAX_DELAY_SECS)).unwrap_or_default()
}

/// Passive-DNS lookup settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub max_attempts: u32,
    /// Random pause before every request, in seconds
    pub delay_min: f64,
    pub delay_max: f64,
    /// Exponential backoff base and jitter, in seconds
    pub backoff_base: f64,
    pub jitter: f64,
    /// Query subdomains when the exact lookup finds fewer addresses than this
    pub subdomain_threshold: usize,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: TIMEOUT_SECS,
            max_attempts: 3,
            delay_min: 1.0,
            delay_max: 3.0,
            backoff_base: 1.0,
            jitter: 1.0,
            subdomain_threshold: SUBDOMAIN_THRESHOLD,
        }
    }
}

/// System DNS fallback settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnsConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: DNS_TIMEOUT_SECS,
        }
    }
}
