//! CLI argument parsing with clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "routerus")]
#[command(author, version, about = "Static route generator for categorized domain lists")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (defaults apply when omitted)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a domain list and write route files
    Generate(GenerateArgs),

    /// List supported output formats
    Formats,

    /// Show version
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Categorized domain list (overrides input_file from the config)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Formats to generate (repeatable, default: all)
    #[arg(short, long = "format", value_name = "FORMAT")]
    pub formats: Vec<String>,

    /// Concurrent lookups
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Skip lookups and use a previously saved resolved set
    #[arg(long, value_name = "FILE")]
    pub from_resolved: Option<PathBuf>,

    /// Save the resolved set as JSON for later reuse
    #[arg(long, value_name = "FILE")]
    pub save_resolved: Option<PathBuf>,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses_help() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_version_command() {
        let cli = Cli::try_parse_from(["routerus", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_formats_command() {
        let cli = Cli::try_parse_from(["routerus", "formats"]).unwrap();
        assert!(matches!(cli.command, Commands::Formats));
    }

    #[test]
    fn test_cli_generate_minimal() {
        let cli = Cli::try_parse_from(["routerus", "generate", "-i", "domains.txt"]).unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.input, Some(PathBuf::from("domains.txt")));
                assert!(args.output.is_none());
                assert!(args.formats.is_empty());
                assert!(args.workers.is_none());
                assert!(!args.no_progress);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_full() {
        let cli = Cli::try_parse_from([
            "routerus",
            "-v",
            "generate",
            "--input",
            "domains.txt",
            "-o",
            "out",
            "-f",
            "mikrotik",
            "--format",
            "cidr",
            "-w",
            "4",
            "--save-resolved",
            "resolved.json",
            "--no-progress",
        ])
        .unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.output, Some(PathBuf::from("out")));
                assert_eq!(args.formats, vec!["mikrotik", "cidr"]);
                assert_eq!(args.workers, Some(4));
                assert_eq!(args.save_resolved, Some(PathBuf::from("resolved.json")));
                assert!(args.no_progress);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_input_may_come_from_config() {
        let cli = Cli::try_parse_from(["routerus", "generate"]).unwrap();
        match cli.command {
            Commands::Generate(args) => assert!(args.input.is_none()),
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_rejects_unknown_flag() {
        assert!(Cli::try_parse_from(["routerus", "generate", "--dry-run"]).is_err());
    }

    #[test]
    fn test_cli_generate_from_resolved_without_input() {
        let args = ["routerus", "generate", "--from-resolved", "resolved.json"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert!(args.input.is_none());
                assert_eq!(args.from_resolved, Some(PathBuf::from("resolved.json")));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["routerus", "formats", "-c", "routerus.yaml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("routerus.yaml")));
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["routerus", "-q", "-v", "version"]).is_err());
    }
}
