//! Feed stdin lines into a logging session.
//!
//! Each line is `<code> <message>`. A leading `!` (`!500 out of memory`)
//! asks for termination once the entry is written.

use std::io::BufRead;

use anyhow::{Context, Result};
use runlog_logging::{ErrorOutcome, LogError, VersionedLogger};

/// One parsed input line
#[derive(Debug, PartialEq, Eq)]
pub struct PipeEntry<'a> {
    pub code: i64,
    pub message: &'a str,
    pub should_exit: bool,
}

/// Why a pipe run stopped
#[derive(Debug)]
pub enum PipeEnd {
    /// Input exhausted
    Eof { logged: usize, skipped: usize },
    /// An entry requested termination
    Terminated { logged: usize, outcome: ErrorOutcome },
}

/// Parse `<code> <message>`, with an optional leading `!`.
///
/// Returns `None` for blank lines and lines without a numeric code.
pub fn parse_line(line: &str) -> Option<PipeEntry<'_>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (should_exit, rest) = match line.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let rest = rest.trim_start();
    let (code, message) = match rest.split_once(char::is_whitespace) {
        Some((code, message)) => (code, message.trim_start()),
        None => (rest, ""),
    };

    let code = code.parse().ok()?;
    Some(PipeEntry {
        code,
        message,
        should_exit,
    })
}

/// Log every well-formed line from `reader` until EOF or a termination request.
///
/// Read errors are returned with context; write errors are returned as-is so
/// the caller can treat them as catastrophic.
pub fn run(logger: &VersionedLogger, reader: impl BufRead) -> Result<Result<PipeEnd, LogError>> {
    let mut logged = 0;
    let mut skipped = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read input")?;
        if line.trim().is_empty() {
            continue;
        }

        let Some(entry) = parse_line(&line) else {
            tracing::warn!(line = index + 1, "Skipping input without a numeric code");
            skipped += 1;
            continue;
        };

        let outcome = match logger.error(entry.code, entry.message, entry.should_exit) {
            Ok(outcome) => outcome,
            Err(e) => return Ok(Err(e)),
        };
        logged += 1;

        if outcome.should_exit() {
            return Ok(Ok(PipeEnd::Terminated { logged, outcome }));
        }
    }

    Ok(Ok(PipeEnd::Eof { logged, skipped }))
}
