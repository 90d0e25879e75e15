//! Writing route files and the run summary.
//!
//! Layout under the output directory:
//!
//! ```text
//! <output_dir>/<format>/<category>.txt
//! <output_dir>/<format>/all_routes.txt
//! <output_dir>/summary.json
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::aggregator::{consolidate, count_covered};
use crate::error::RouterusError;
use crate::formats::RouteFormat;
use crate::fs_abstraction::FileSystem;
use crate::resolution::Resolution;
use crate::route::Route;
use crate::utils::file_stem_for;

/// Per-format file holding every category's routes
pub const ALL_ROUTES_FILE: &str = "all_routes.txt";

/// Run summary written at the root of the output directory
pub const SUMMARY_FILE: &str = "summary.json";

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub format: RouteFormat,
    /// `None` for the all-categories file
    pub category: Option<String>,
    pub path: PathBuf,
    pub route_count: usize,
}

/// Consolidated routes of every category with at least one address.
pub fn consolidate_all(resolution: &Resolution) -> BTreeMap<String, Vec<Route>> {
    resolution
        .categories()
        .iter()
        .filter(|(_, ips)| !ips.is_empty())
        .map(|(category, ips)| (category.clone(), consolidate(category, ips)))
        .collect()
}

fn write_file(fs: &dyn FileSystem, path: &Path, content: &str) -> Result<(), RouterusError> {
    fs.write(path, content.as_bytes()).map_err(|e| {
        RouterusError::FileSystem(format!("Failed to write {}: {}", path.display(), e))
    })
}

/// File stem per category, unique within a format directory.
///
/// Names that sanitize to the same stem (compared case-insensitively) or to
/// the all-categories file get a numeric suffix, in category order.
fn unique_stems<'a>(categories: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let reserved = ALL_ROUTES_FILE.trim_end_matches(".txt").to_lowercase();
    let mut taken: HashSet<String> = HashSet::from([reserved]);
    let mut stems = Vec::new();

    for category in categories {
        let base = file_stem_for(category);
        let mut stem = base.clone();
        let mut n = 2;
        while !taken.insert(stem.to_lowercase()) {
            stem = format!("{}_{}", base, n);
            n += 1;
        }
        if stem != base {
            warn!(
                "Category {:?} clashes with another file name, writing {}.txt",
                category, stem
            );
        }
        stems.push(stem);
    }
    stems
}

/// Render every format for every category and write the file tree.
///
/// `routes_by_category` comes from [`consolidate_all`] and is shared by all
/// formats. Returns the files written in the order they were written.
pub fn write_artifacts(
    fs: &dyn FileSystem,
    output_dir: &Path,
    formats: &[RouteFormat],
    routes_by_category: &BTreeMap<String, Vec<Route>>,
) -> Result<Vec<Artifact>, RouterusError> {
    let all_routes: Vec<Route> = routes_by_category.values().flatten().cloned().collect();
    let stems = unique_stems(routes_by_category.keys());

    let mut artifacts = Vec::new();
    for &format in formats {
        let format_dir = output_dir.join(format.id());
        fs.create_dir_all(&format_dir).map_err(|e| {
            RouterusError::FileSystem(format!(
                "Failed to create directory {}: {}",
                format_dir.display(),
                e
            ))
        })?;

        for ((category, routes), stem) in routes_by_category.iter().zip(&stems) {
            let path = format_dir.join(format!("{}.txt", stem));
            write_file(fs, &path, &format.render(routes, Some(category)))?;
            debug!("Wrote {}", path.display());
            artifacts.push(Artifact {
                format,
                category: Some(category.clone()),
                path,
                route_count: routes.len(),
            });
        }

        let path = format_dir.join(ALL_ROUTES_FILE);
        write_file(fs, &path, &format.render(&all_routes, None))?;
        artifacts.push(Artifact {
            format,
            category: None,
            path,
            route_count: all_routes.len(),
        });
    }

    info!(
        "Wrote {} files for {} formats to {}",
        artifacts.len(),
        formats.len(),
        output_dir.display()
    );
    Ok(artifacts)
}

/// Counts for one category in the run summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub domains: usize,
    pub ips: usize,
    pub routes: usize,
    /// Addresses covered by the routes, aggregates included
    pub covered: u64,
}

/// Machine-readable record of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub total_domains: usize,
    pub resolved_domains: usize,
    pub failed_domains: Vec<String>,
    pub total_ips: usize,
    pub cancelled: bool,
    pub categories: BTreeMap<String, CategorySummary>,
    pub formats: Vec<String>,
    pub files_written: usize,
}

impl RunSummary {
    pub fn new(
        total_domains: usize,
        resolution: &Resolution,
        routes_by_category: &BTreeMap<String, Vec<Route>>,
        formats: &[RouteFormat],
        artifacts: &[Artifact],
    ) -> Self {
        let categories = resolution
            .categories()
            .iter()
            .map(|(name, ips)| {
                let routes = routes_by_category.get(name).map(Vec::as_slice).unwrap_or(&[]);
                let summary = CategorySummary {
                    domains: ips.domains().len(),
                    ips: ips.len(),
                    routes: routes.len(),
                    covered: count_covered(routes),
                };
                (name.clone(), summary)
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            total_domains,
            resolved_domains: resolution.resolved_domain_count(),
            failed_domains: resolution.failed().iter().cloned().collect(),
            total_ips: resolution.total_ips(),
            cancelled: resolution.was_cancelled(),
            categories,
            formats: formats.iter().map(|f| f.id().to_string()).collect(),
            files_written: artifacts.len(),
        }
    }

    /// Write as pretty JSON to `<output_dir>/summary.json`
    pub fn write(&self, fs: &dyn FileSystem, output_dir: &Path) -> Result<PathBuf, RouterusError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| RouterusError::FileSystem(format!("Failed to serialize summary: {}", e)))?;
        fs.create_dir_all(output_dir).map_err(|e| {
            RouterusError::FileSystem(format!(
                "Failed to create directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;
        let path = output_dir.join(SUMMARY_FILE);
        write_file(fs, &path, &content)?;
        Ok(path)
    }
}
