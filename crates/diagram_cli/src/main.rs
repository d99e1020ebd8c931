//! Diagrams CLI: keeps a documentation tree and its rendered diagram store in sync.
//!
//! Provides `diagrams clean` for removing artifacts no page references,
//! `diagrams check-missing` for finding diagrams that were never rendered, and
//! `diagrams generate` for rendering everything a tree needs.

#![warn(missing_docs)]

mod check;
mod clean;
mod generate;
mod logging;
mod pipeline;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// Diagrams: a content-addressed cache of rendered documentation diagrams.
#[derive(Parser, Debug)]
#[command(name = "diagrams", version, about = "Diagram artifact cache maintenance")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `diagrams.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the diagrams store directory.
    #[arg(long, global = true)]
    pub diagrams_dir: Option<String>,

    /// Output format for reports.
    #[arg(long, global = true, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report, and optionally delete, diagrams no page references.
    Clean(CleanArgs),
    /// Report diagrams referenced by pages that have no rendered artifact.
    CheckMissing(CheckArgs),
    /// Render every diagram in the documentation tree that is not cached.
    Generate(GenerateArgs),
}

/// Arguments for the `diagrams clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Delete orphaned artifacts instead of only listing them.
    #[arg(long)]
    pub delete: bool,

    /// Documentation root to scan.
    #[arg(long, default_value = "docs")]
    pub docs: PathBuf,
}

/// Arguments for the `diagrams check-missing` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Documentation root to scan.
    #[arg(long, default_value = "docs")]
    pub docs: PathBuf,

    /// Also fail when an artifact is still a placeholder.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for the `diagrams generate` subcommand.
#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Documentation root to scan.
    #[arg(long, default_value = "docs")]
    pub docs: PathBuf,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
    /// Optional store directory override.
    pub diagrams_dir: Option<String>,
    /// Report output format.
    pub format: ReportFormat,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        diagrams_dir: cli.diagrams_dir,
        format: cli.format,
    };

    logging::init(&global);

    let result = match cli.command {
        Command::Clean(ref args) => clean::run(args, &global),
        Command::CheckMissing(ref args) => check::run(args, &global),
        Command::Generate(ref args) => generate::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_clean_default() {
        let cli = Cli::parse_from(["diagrams", "clean"]);
        match cli.command {
            Command::Clean(ref args) => {
                assert!(!args.delete);
                assert_eq!(args.docs, PathBuf::from("docs"));
            }
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_clean_with_args() {
        let cli = Cli::parse_from(["diagrams", "clean", "--delete", "--docs", "site/docs"]);
        match cli.command {
            Command::Clean(ref args) => {
                assert!(args.delete);
                assert_eq!(args.docs, PathBuf::from("site/docs"));
            }
            _ => panic!("expected Clean command"),
        }
    }

    #[test]
    fn parse_check_missing() {
        let cli = Cli::parse_from(["diagrams", "check-missing", "--strict"]);
        match cli.command {
            Command::CheckMissing(ref args) => {
                assert!(args.strict);
                assert_eq!(args.docs, PathBuf::from("docs"));
            }
            _ => panic!("expected CheckMissing command"),
        }
    }

    #[test]
    fn parse_generate() {
        let cli = Cli::parse_from(["diagrams", "generate", "--docs", "guide"]);
        match cli.command {
            Command::Generate(ref args) => assert_eq!(args.docs, PathBuf::from("guide")),
            _ => panic!("expected Generate command"),
        }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::parse_from([
            "diagrams",
            "--quiet",
            "--format",
            "json",
            "--diagrams-dir",
            "public/diagrams",
            "clean",
        ]);
        assert!(cli.quiet);
        assert!(!cli.verbose);
        assert_eq!(cli.format, ReportFormat::Json);
        assert_eq!(cli.diagrams_dir.as_deref(), Some("public/diagrams"));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["diagrams", "check-missing", "--verbose", "--format", "json"]);
        assert!(cli.verbose);
        assert_eq!(cli.format, ReportFormat::Json);
    }

    #[test]
    fn parse_config_path() {
        let cli = Cli::parse_from(["diagrams", "--config", "/path/to/diagrams.toml", "generate"]);
        assert_eq!(cli.config.as_deref(), Some("/path/to/diagrams.toml"));
    }

    #[test]
    fn default_format_is_text() {
        let cli = Cli::parse_from(["diagrams", "clean"]);
        assert_eq!(cli.format, ReportFormat::Text);
    }

    #[test]
    fn unknown_command_rejected() {
        assert!(Cli::try_parse_from(["diagrams", "render"]).is_err());
    }
}
