use std::time::Duration;

/// Format elapsed time as `HH:MM:SS`.
///
/// Sub-second precision is truncated. Hours are not wrapped at 24, so a
/// session running for a day and a half prints `36:00:00`.
pub fn format_delta(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Render one complete log line, trailing newline included.
///
/// The message is written verbatim; embedded newlines are not escaped.
pub fn format_entry(code: i64, elapsed: Duration, message: &str) -> String {
    format!(
        "[ERROR {} @ {}]: {}\n",
        code,
        format_delta(elapsed),
        message
    )
}
