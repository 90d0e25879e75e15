//! # Routerus - Static Route Generator for Domain Lists
//!
//! Turns a categorized list of domains into static route tables, so traffic to
//! those services can be steered through a chosen gateway.
//!
//! ## Features
//!
//! - **Lenient Input** - Free-form domain lists with URLs, notes and comments
//! - **Passive DNS** - Historical A records from a rapiddns.io style service
//! - **DNS Fallback** - System resolver for names the service does not know
//! - **Consolidation** - Dense address groups collapse into /24 and /16 routes
//! - **Thirteen Formats** - Windows, Linux, MikroTik, Keenetic, OpenVPN, WireGuard,
//!   Cisco, Huawei, D-Link, OpenWrt, TP-Link, ASUS and plain CIDR
//! - **Polite** - Bounded concurrency, random pauses and exponential backoff
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Routerus                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── Commands: generate, formats, version                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Config (serde_yaml)                                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Catalog (regex)                                            │
//! │    └── Category -> domains                                  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Resolver (tokio + futures)                                 │
//! │    ├── RapidDns scraper over PageFetcher (reqwest + rustls) │
//! │    └── SystemDns fallback (dns-lookup)                      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Aggregator (ipnet)                                         │
//! │    └── /16, /24 and /32 route consolidation                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Formats + Output                                           │
//! │    └── <output>/<format>/<category>.txt, all_routes.txt     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use routerus::catalog::DomainCatalog;
//! use routerus::fetcher::{HttpFetcher, RetryPolicy, DEFAULT_USER_AGENT};
//! use routerus::formats::RouteFormat;
//! use routerus::fs_abstraction::real_fs;
//! use routerus::output::{consolidate_all, write_artifacts};
//! use routerus::resolver::{ResolveProgress, Resolver};
//! use routerus::scrape::{RapidDns, DEFAULT_BASE_URL};
//! use routerus::signal::ShutdownToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = DomainCatalog::load(real_fs(), Path::new("domains.txt"))?;
//!
//!     let fetcher = HttpFetcher::new(Duration::from_secs(15), DEFAULT_USER_AGENT)?;
//!     let scraper = RapidDns::new(DEFAULT_BASE_URL, Arc::new(fetcher), RetryPolicy::default());
//!     let resolver = Resolver::new(scraper, ShutdownToken::new());
//!
//!     let resolution = resolver.resolve_all(&catalog, &ResolveProgress::new()).await;
//!     let routes = consolidate_all(&resolution);
//!     write_artifacts(real_fs(), Path::new("routes"), &RouteFormat::ALL, &routes)?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`aggregator`] - Route consolidation and address parsing
//! - [`catalog`] - Categorized domain list parsing
//! - [`cli`] - Command-line interface definitions
//! - [`commands`] - CLI command implementations
//! - [`config`] - Configuration parsing and validation
//! - [`dns`] - System DNS fallback with timeout
//! - [`error`] - Typed library errors
//! - [`fetcher`] - HTTP page fetching with retry policy
//! - [`formats`] - Route table renderers
//! - [`fs_abstraction`] - Filesystem trait for testable I/O
//! - [`output`] - Artifact tree and run summary
//! - [`resolution`] - Resolved addresses per category and domain
//! - [`resolver`] - Concurrent catalog resolution
//! - [`route`] - Route value type
//! - [`scrape`] - Passive-DNS page lookup and parsing
//! - [`signal`] - Cooperative cancellation on shutdown signals
//! - [`utils`] - Common utility functions (formatting, file names)

pub mod aggregator;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dns;
pub mod error;
pub mod fetcher;
pub mod formats;
pub mod fs_abstraction;
pub mod output;
pub mod resolution;
pub mod resolver;
pub mod route;
pub mod scrape;
pub mod signal;
pub mod utils;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use error::RouterusError;
