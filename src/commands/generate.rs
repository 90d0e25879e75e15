//! Generate command implementation.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::DomainCatalog;
use crate::cli::GenerateArgs;
use crate::config::Config;
use crate::dns::SystemDns;
use crate::error::RouterusError;
use crate::fetcher::HttpFetcher;
use crate::formats::{parse_formats, RouteFormat};
use crate::fs_abstraction::{real_fs, FileSystem};
use crate::output::{consolidate_all, write_artifacts, RunSummary};
use crate::resolution::Resolution;
use crate::resolver::{ResolveProgress, Resolver};
use crate::scrape::RapidDns;
use crate::signal::{cancel_on_signal, ShutdownToken};
use crate::utils::format_count;

/// Run the generate command
pub async fn run(args: GenerateArgs, config_path: Option<&Path>, quiet: bool) -> Result<()> {
    let mut config = match config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => Config::default(),
    };
    apply_overrides(&mut config, &args);
    config.validate()?;

    let formats = parse_formats(&config.formats)?;
    info!("Generating formats: {}", describe_formats(&formats));
    let fs = real_fs();
    let show_progress = !args.no_progress && !quiet;

    let (resolution, total_domains) = match &args.from_resolved {
        Some(path) => load_resolution(fs, path)?,
        None => {
            let input = config.input_file.clone().ok_or_else(|| {
                RouterusError::Config("No input file given (use --input or input_file)".into())
            })?;
            resolve_input(&config, fs, &input, show_progress).await?
        }
    };

    if let Some(path) = &args.save_resolved {
        fs.write(path, resolution.to_json()?.as_bytes())
            .with_context(|| format!("Failed to save resolved set to {:?}", path))?;
        info!("Saved resolved set to {:?}", path);
    }

    let routes = consolidate_all(&resolution);
    let artifacts = write_artifacts(fs, &config.output_dir, &formats, &routes)?;

    if config.write_summary {
        let summary = RunSummary::new(total_domains, &resolution, &routes, &formats, &artifacts);
        let path = summary.write(fs, &config.output_dir)?;
        info!("Wrote run summary to {:?}", path);
    }

    println!();
    println!(
        "[OK] {} files in {} formats written to {}",
        format_count(artifacts.len()),
        formats.len(),
        config.output_dir.display()
    );
    println!(
        "{} of {} domains failed ({} IPs resolved)",
        resolution.failed().len(),
        total_domains,
        format_count(resolution.total_ips())
    );

    if resolution.was_cancelled() {
        anyhow::bail!("Interrupted: route files contain only the domains resolved before shutdown");
    }

    Ok(())
}

/// Command-line values take precedence over the config file
fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if let Some(input) = &args.input {
        config.input_file = Some(input.clone());
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }
    if !args.formats.is_empty() {
        config.formats = args.formats.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
}

/// Load a saved resolved set. Returns it with its domain count.
fn load_resolution(fs: &dyn FileSystem, path: &Path) -> Result<(Resolution, usize)> {
    let content = fs
        .read_to_string(path)
        .with_context(|| format!("Failed to read resolved set {:?}", path))?;
    let resolution = Resolution::from_json(&content)
        .with_context(|| format!("Invalid resolved set {:?}", path))?;

    let total = resolution.resolved_domain_count() + resolution.failed().len();
    info!(
        "Loaded {} domains ({} IPs) from {:?}",
        format_count(total),
        format_count(resolution.total_ips()),
        path
    );
    Ok((resolution, total))
}

async fn resolve_input(
    config: &Config,
    fs: &dyn FileSystem,
    input: &Path,
    show_progress: bool,
) -> Result<(Resolution, usize)> {
    let catalog = DomainCatalog::load(fs, input)?;
    if catalog.is_empty() {
        warn!("No domains to resolve in {:?}", input);
    }

    let token = ShutdownToken::new();
    cancel_on_signal(token.clone());
    let resolver = build_resolver(config, token)?;

    let progress = Arc::new(ResolveProgress::new());
    let bar = create_progress_bar(catalog.unique_domain_count() as u64, show_progress);
    let ticker = {
        let progress = Arc::clone(&progress);
        let bar = bar.clone();
        tokio::spawn(async move {
            loop {
                bar.set_length(progress.total() as u64);
                bar.set_position(progress.completed() as u64);
                bar.set_message(format!("{} failed", progress.failed()));
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
        })
    };

    let resolution = resolver.resolve_all(&catalog, &progress).await;
    ticker.abort();
    bar.finish_and_clear();

    Ok((resolution, catalog.unique_domain_count()))
}

/// Wire the lookup stack from configuration
fn build_resolver(config: &Config, token: ShutdownToken) -> Result<Resolver> {
    let fetcher = HttpFetcher::new(
        Duration::from_secs(config.lookup.timeout_secs),
        &config.lookup.user_agent,
    )?;
    let scraper = RapidDns::new(&config.lookup.base_url, Arc::new(fetcher), config.retry_policy())
        .with_subdomain_threshold(config.lookup.subdomain_threshold);

    let mut resolver = Resolver::new(scraper, token).with_workers(config.workers);
    if config.dns.enabled {
        let dns = SystemDns::new(Duration::from_secs(config.dns.timeout_secs));
        resolver = resolver.with_dns(Arc::new(dns));
    }
    Ok(resolver)
}

fn create_progress_bar(len: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) =
        ProgressStyle::with_template("{elapsed_precise} {bar:36.cyan/blue} {pos:>4}/{len:4} {msg}")
    {
        bar.set_style(style.progress_chars("■■□"));
    }
    bar
}

/// Formats selected for a run, for display
pub fn describe_formats(formats: &[RouteFormat]) -> String {
    formats.iter().map(|f| f.id()).collect::<Vec<_>>().join(", ")
}
