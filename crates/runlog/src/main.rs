mod config;
mod pipe;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Serialize;

use config::{RunlogConfig, SessionSettings};
use pipe::PipeEnd;
use runlog_logging::{init_tracing, version, LogError, LogFormat, VersionedLogger};

/// Exit code used when the log itself cannot be written.
const CATASTROPHIC_EXIT: i32 = 255;

#[derive(Parser, Debug)]
#[command(
    name = "runlog",
    about = "Versioned per-run error logs",
    version,
    author
)]
struct Cli {
    /// Log file stem (overrides `name` in runlog.toml)
    #[arg(short, long, global = true)]
    name: Option<String>,

    /// Directory for log files (default: system temp dir)
    #[arg(short = 'd', long, global = true)]
    dir: Option<PathBuf>,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Diagnostic log format
    #[arg(long, global = true, value_enum, default_value = "compact")]
    log_format: LogFormatChoice,

    /// Print session details as JSON on stdout
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a new session and log a single entry
    Log {
        /// Error code
        #[arg(short, long, allow_hyphen_values = true)]
        code: i64,

        /// Error message
        #[arg(short, long)]
        message: String,

        /// Exit non-zero after logging
        #[arg(long)]
        exit: bool,
    },
    /// Open a new session and log `<code> <message>` lines from stdin
    Pipe,
    /// Show the version the next session would get, without creating it
    NextVersion,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatChoice {
    Pretty,
    Json,
    Compact,
}

impl From<LogFormatChoice> for LogFormat {
    fn from(choice: LogFormatChoice) -> Self {
        match choice {
            LogFormatChoice::Pretty => LogFormat::Pretty,
            LogFormatChoice::Json => LogFormat::Json,
            LogFormatChoice::Compact => LogFormat::Compact,
        }
    }
}

#[derive(Debug, Serialize)]
struct SessionInfo<'a> {
    base_name: &'a str,
    version: u64,
    path: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    started_at: Option<DateTime<Utc>>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_format.into());

    let working_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = RunlogConfig::discover(&working_dir)?;
    let settings = SessionSettings::resolve(
        cli.name.as_deref(),
        cli.dir.as_deref(),
        config.as_ref(),
        VersionedLogger::default_directory(),
    )?;

    match &cli.command {
        Command::NextVersion => {
            let next = version::next_version(&settings.directory, &settings.name)?;
            let path = version::log_path(&settings.directory, &settings.name, next);
            let info = SessionInfo {
                base_name: &settings.name,
                version: next,
                path: &path,
                started_at: None,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", path.display());
            }
        }
        Command::Log {
            code,
            message,
            exit,
        } => {
            let logger = open_session(&settings)?;
            print_session(&logger, cli.json)?;

            let outcome = logger
                .error(*code, message, *exit)
                .unwrap_or_else(|e| catastrophic(e));
            if outcome.should_exit() {
                std::process::exit(outcome.exit_code());
            }
        }
        Command::Pipe => {
            let logger = open_session(&settings)?;
            print_session(&logger, cli.json)?;

            let stdin = std::io::stdin();
            match pipe::run(&logger, stdin.lock())? {
                Ok(PipeEnd::Eof { logged, skipped }) => {
                    tracing::info!(logged, skipped, "Input exhausted");
                }
                Ok(PipeEnd::Terminated { logged, outcome }) => {
                    tracing::info!(logged, "Termination requested");
                    std::process::exit(outcome.exit_code());
                }
                Err(e) => catastrophic(e),
            }
        }
    }

    Ok(())
}

fn open_session(settings: &SessionSettings) -> Result<VersionedLogger> {
    VersionedLogger::in_dir(&settings.name, &settings.directory).with_context(|| {
        format!(
            "Failed to open log session in {}",
            settings.directory.display()
        )
    })
}

fn print_session(logger: &VersionedLogger, json: bool) -> Result<()> {
    if json {
        let info = SessionInfo {
            base_name: logger.base_name(),
            version: logger.version(),
            path: logger.path(),
            started_at: Some(logger.started_at()),
        };
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "{} {}",
            "Logging to".dimmed(),
            logger.path().display().to_string().bright_white()
        );
    }
    Ok(())
}

fn catastrophic(error: LogError) -> ! {
    eprintln!(
        "{} {}",
        "Catastrophic error during logging:".bright_red(),
        error
    );
    std::process::exit(CATASTROPHIC_EXIT);
}
