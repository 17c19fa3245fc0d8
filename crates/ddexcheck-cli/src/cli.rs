//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// ddexcheck - validate DDEX release metadata
///
/// Checks ERN messages for structural conformance with their schema version
/// and for business-rule violations: identifier formats, duplicates, dangling
/// references, incomplete deals, durations, dates, territory and language codes.
#[derive(Parser, Debug)]
#[command(
    name = "ddexcheck",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "DDEXCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate DDEX files or directories of files
    Validate(ValidateArgs),

    /// Show message metadata for a DDEX file without validating it
    Info(InfoArgs),

    /// List the schema versions available for validation
    Schemas(SchemasArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug, Default)]
pub struct ValidateArgs {
    /// Files or directories to validate
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Schema file or built-in resource (`builtin:ern-382`) to validate against
    #[arg(long, value_name = "SOURCE", conflicts_with = "schema_dir")]
    pub schema: Option<String>,

    /// Directory to discover a schema file in for --schema-version
    #[arg(long, value_name = "DIR", requires = "schema_version")]
    pub schema_dir: Option<PathBuf>,

    /// ERN version to validate against (e.g. 3.8.2 or 382)
    #[arg(long, value_name = "VERSION")]
    pub schema_version: Option<String>,

    /// Skip business rules (schema validation only)
    #[arg(long, conflicts_with = "rules_only")]
    pub no_business_rules: bool,

    /// Skip schema validation (business rules only)
    #[arg(long)]
    pub rules_only: bool,

    /// Verify identifier check characters and skip rules after schema errors
    #[arg(long)]
    pub strict: bool,

    /// Treat warnings as errors
    #[arg(long)]
    pub warnings_as_errors: bool,

    /// Keep validating remaining files after a fatal error
    #[arg(long)]
    pub continue_on_error: bool,

    /// Number of parallel workers
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Per-file time limit in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// File name pattern used when expanding directories
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Rule id to skip (repeatable)
    #[arg(long = "disable-rule", value_name = "RULE_ID")]
    pub disable_rules: Vec<String>,

    /// Also write the report to this file, format chosen by extension
    #[arg(long = "save-to", value_name = "FILE")]
    pub save_to: Option<PathBuf>,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// DDEX file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,
}

/// Arguments for the schemas command
#[derive(Parser, Debug)]
pub struct SchemasArgs {
    /// Also list the business rules
    #[arg(long)]
    pub rules: bool,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
    /// YAML output
    Yaml,
    /// One CSV row per diagnostic
    Csv,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl OutputFormat {
    /// Format implied by a file extension, for `--save-to`
    pub fn from_extension(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "json" => Some(OutputFormat::JsonPretty),
            "yaml" | "yml" => Some(OutputFormat::Yaml),
            "csv" => Some(OutputFormat::Csv),
            "txt" => Some(OutputFormat::Human),
            _ => None,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_validate_flags() {
        let cli = Cli::parse_from([
            "ddexcheck",
            "-o",
            "csv",
            "validate",
            "releases/",
            "extra.xml",
            "--strict",
            "--jobs",
            "4",
            "--disable-rule",
            "duration-presence",
            "--disable-rule",
            "language-code",
            "--recursive",
        ]);
        assert_eq!(cli.output, OutputFormat::Csv);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.paths.len(), 2);
        assert!(args.strict);
        assert!(args.recursive);
        assert_eq!(args.jobs, Some(4));
        assert_eq!(args.disable_rules, vec!["duration-presence", "language-code"]);
    }

    #[test]
    fn test_schema_dir_requires_version() {
        let result = Cli::try_parse_from(["ddexcheck", "validate", "a.xml", "--schema-dir", "schemas"]);
        assert!(result.is_err());

        let result = Cli::try_parse_from([
            "ddexcheck",
            "validate",
            "a.xml",
            "--schema-dir",
            "schemas",
            "--schema-version",
            "4.1",
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_stage_flags_conflict() {
        let result = Cli::try_parse_from(["ddexcheck", "validate", "a.xml", "--rules-only", "--no-business-rules"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["ddexcheck", "-vv", "schemas"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["ddexcheck", "--quiet", "schemas"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_save_to_extension() {
        assert_eq!(OutputFormat::from_extension("r.json".as_ref()), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_extension("r.CSV".as_ref()), Some(OutputFormat::Csv));
        assert_eq!(OutputFormat::from_extension("r".as_ref()), None);
    }
}
