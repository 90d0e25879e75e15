//! Categorized domain list parsing.
//!
//! The input is loosely structured, human-curated text:
//!
//! ```text
//! Banks
//! sberbank.ru - Sberbank online
//! https://www.vtb.ru/personal/
//! # comment lines are skipped
//!
//! Government
//! gosuslugi.ru
//! ```
//!
//! Sections are separated by blank lines or by a single capitalised word on
//! its own line. The first line of a section names the category; every other
//! line is scanned for a domain. Lines without a recognisable domain are
//! dropped.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, error, info};

use crate::error::RouterusError;
use crate::fs_abstraction::FileSystem;

static EMBEDDED_DOMAIN: OnceLock<Regex> = OnceLock::new();
static STRICT_DOMAIN: OnceLock<Regex> = OnceLock::new();
static HEADER_LINE: OnceLock<Regex> = OnceLock::new();

fn embedded_domain() -> &'static Regex {
    EMBEDDED_DOMAIN.get_or_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.)?([a-zA-Z0-9][-a-zA-Z0-9]*(?:\.[a-zA-Z0-9][-a-zA-Z0-9]*)+)",
        )
        .expect("embedded domain pattern is valid")
    })
}

fn strict_domain() -> &'static Regex {
    STRICT_DOMAIN.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9][-a-zA-Z0-9]*(?:\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$")
            .expect("strict domain pattern is valid")
    })
}

fn header_line() -> &'static Regex {
    HEADER_LINE
        .get_or_init(|| Regex::new(r"^\p{Lu}\w*$").expect("header pattern is valid"))
}

/// Check that a string is a dotted hostname (`label(.label)+`).
pub fn is_valid_domain(candidate: &str) -> bool {
    strict_domain().is_match(candidate)
}

/// A line that opens a new section even without a preceding blank line.
///
/// Prose lines made of a single capitalised word match too, which turns them
/// into categories of their own.
pub fn is_header_like(line: &str) -> bool {
    header_line().is_match(line.trim_end())
}

/// Extract the domain a candidate line refers to, if any.
///
/// A URL or domain embedded anywhere in the line wins; otherwise the first
/// token (split on whitespace, `-` or `–`) is taken when it is a strict
/// hostname.
pub fn extract_domain(line: &str) -> Option<String> {
    if let Some(captures) = embedded_domain().captures(line) {
        if let Some(domain) = captures.get(1) {
            return Some(domain.as_str().to_string());
        }
    }

    let candidate = line
        .split(|c: char| c.is_whitespace() || c == '-' || c == '–')
        .next()
        .unwrap_or_default()
        .trim();
    if is_valid_domain(candidate) {
        Some(candidate.to_string())
    } else {
        None
    }
}

/// Categories mapped to their domains, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainCatalog {
    categories: BTreeMap<String, Vec<String>>,
}

impl DomainCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and parse a domain list.
    ///
    /// A missing file is logged and yields an empty catalog. Any other read
    /// failure is returned as [`RouterusError::Parse`].
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, RouterusError> {
        let content = match fs.read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("Domain list {:?} not found", path);
                return Ok(Self::new());
            }
            Err(source) => {
                return Err(RouterusError::Parse {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        info!("Loading domains from {:?}", path);
        let catalog = Self::parse(&content);
        info!(
            "Loaded {} domains in {} categories",
            catalog.domain_count(),
            catalog.category_count()
        );
        Ok(catalog)
    }

    /// Parse domain list text. Never fails; unusable lines are dropped.
    pub fn parse(text: &str) -> Self {
        let mut catalog = Self::new();

        for section in split_sections(text) {
            if section.len() < 2 {
                continue;
            }

            let category = section[0].trim();
            for raw in &section[1..] {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                match extract_domain(line) {
                    Some(domain) => catalog.insert(category, domain),
                    None => debug!("Dropping line without a domain in {}: {}", category, line),
                }
            }
        }

        catalog
    }

    /// Append a domain to a category, creating the category if needed.
    pub fn insert(&mut self, category: &str, domain: impl Into<String>) {
        self.categories
            .entry(category.to_string())
            .or_default()
            .push(domain.into());
    }

    /// Render in the same header-plus-lines convention `parse` reads.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (category, domains) in &self.categories {
            if domains.is_empty() {
                continue;
            }
            out.push_str(category);
            out.push('\n');
            for domain in domains {
                out.push_str(domain);
                out.push('\n');
            }
            out.push('\n');
        }
        out
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn domains(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Every (category, domain) pair, categories in name order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().flat_map(|(category, domains)| {
            domains
                .iter()
                .map(move |domain| (category.as_str(), domain.as_str()))
        })
    }

    pub fn domain_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Distinct domain names across all categories.
    pub fn unique_domain_count(&self) -> usize {
        self.categories
            .values()
            .flatten()
            .collect::<std::collections::BTreeSet<_>>()
            .len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.values().all(Vec::is_empty)
    }
}

/// Split text into sections of non-blank lines.
fn split_sections(text: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(std::mem::take(&mut current));
            }
            continue;
        }

        let has_next = i + 1 < lines.len();
        if has_next && !current.is_empty() && is_header_like(line) {
            sections.push(std::mem::take(&mut current));
        }
        current.push(line);
    }

    if !current.is_empty() {
        sections.push(current);
    }
    sections
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn label_strategy() -> impl Strategy<Value = String> {
        "[a-z0-9][a-z0-9-]{0,10}"
    }

    fn domain_strategy() -> impl Strategy<Value = String> {
        (label_strategy(), "[a-z]{2,6}")
            .prop_map(|(label, tld)| format!("{}.{}", label, tld))
            .prop_filter("www prefix is stripped on parse", |d| !d.starts_with("www."))
    }

    fn category_strategy() -> impl Strategy<Value = String> {
        prop_oneof!["[A-Z][a-z]{2,10}", "[A-Z][a-z]{2,8} [a-z]{2,8}"]
    }

    proptest! {
        /// Rendering a catalog and parsing it back yields the same catalog
        #[test]
        fn prop_parse_to_text_idempotent(
            entries in prop::collection::btree_map(
                category_strategy(),
                prop::collection::vec(domain_strategy(), 1..8),
                0..6,
            )
        ) {
            let mut catalog = DomainCatalog::new();
            for (category, domains) in &entries {
                for domain in domains {
                    catalog.insert(category, domain.clone());
                }
            }

            prop_assert_eq!(DomainCatalog::parse(&catalog.to_text()), catalog);
        }

        /// Every parsed domain satisfies the strict hostname pattern
        #[test]
        fn prop_parsed_domains_are_valid(text in "[A-Za-z0-9 .:/#\\-\n]{0,300}") {
            let catalog = DomainCatalog::parse(&text);
            for (_, domain) in catalog.entries() {
                prop_assert!(is_valid_domain(domain));
            }
        }
    }
}
