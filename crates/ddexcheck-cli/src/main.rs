//! ddexcheck CLI - validate DDEX release metadata
//!
//! Entry point: parses arguments, loads configuration, sets up logging and
//! dispatches to the command handlers. Exit code 0 means every document was
//! valid, 1 means at least one was not or the run failed, and 2 is a usage
//! error reported by clap.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;
use tracing_appender::non_blocking::WorkerGuard;

fn main() {
    let cli = Cli::parse_args();

    let use_color = cli.use_color();
    control::set_override(use_color);

    // Config is loaded before logging so its [logging] section applies
    let config = match Config::load_with_file(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));
            process::exit(e.exit_code());
        }
    };

    let guard = match init_logging(&cli, &config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            None
        }
    };

    let code = match run(cli, &config, use_color) {
        Ok(()) => 0,
        Err(e) => {
            if !e.is_reported() {
                eprintln!("{}", error::format_error(&e, use_color && config.output.color));
                if e.should_show_help() {
                    eprintln!("\nFor more information, try '--help'");
                }
            }
            e.exit_code()
        }
    };

    // process::exit skips destructors; flush the log file first
    drop(guard);
    process::exit(code);
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(
        cli.output,
        use_color && config.output.color,
        cli.quiet,
        cli.verbosity_level(),
    );
    if !config.output.progress {
        output.disable_progress();
    }

    tracing::info!(
        request_id = logging::current_request_id().unwrap_or("unknown"),
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Validate(args) => handlers::handle_validate(args, config, &mut output),
        Commands::Info(args) => handlers::handle_info(args, config, &mut output),
        Commands::Schemas(args) => handlers::handle_schemas(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system from flags, config file and environment
fn init_logging(cli: &Cli, config: &Config) -> Result<Option<WorkerGuard>> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_settings(&config.logging, cli.verbosity_level());
    logging_config.merge_with_env();

    // Quiet mode keeps errors only and never writes logs to the console
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["ddexcheck", "validate", "release.xml"]);
        assert_eq!(cli.verbosity_level(), 0);

        let cli = Cli::parse_from(["ddexcheck", "-vv", "validate", "release.xml"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["ddexcheck", "--quiet", "info", "release.xml"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(cli.quiet);
    }

    #[test]
    fn test_usage_errors_exit_with_two() {
        let error = Cli::try_parse_from(["ddexcheck", "validate"]).unwrap_err();
        assert_eq!(error.exit_code(), 2);
    }
}
