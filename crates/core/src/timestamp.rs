//! Conversion between second counts and `MM:SS` / `HH:MM:SS` strings.
//!
//! Parsing is total: malformed input maps to `0` so a cosmetic glitch in a
//! model reply never aborts a run.

/// Parse `MM:SS`, `HH:MM:SS` or `<n>s` into whole seconds.
pub fn parse_timestamp(text: &str) -> u64 {
    let text = text.trim();

    if let Some(raw) = text.strip_suffix('s') {
        return match raw.trim().parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => secs.floor() as u64,
            _ => 0,
        };
    }

    let parts: Option<Vec<u64>> = text
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect();

    let total = match parts.as_deref() {
        Some(&[mins, secs]) => clock_seconds(0, mins, secs),
        Some(&[hours, mins, secs]) => clock_seconds(hours, mins, secs),
        _ => None,
    };
    total.unwrap_or(0)
}

fn clock_seconds(hours: u64, mins: u64, secs: u64) -> Option<u64> {
    hours
        .checked_mul(3600)?
        .checked_add(mins.checked_mul(60)?)?
        .checked_add(secs)
}

/// Format seconds as `MM:SS`, or `HH:MM:SS` from one hour on
pub fn format_timestamp(seconds: u64) -> String {
    let hours = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours == 0 {
        format!("{:02}:{:02}", mins, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    }
}

/// Always `HH:MM:SS`; used for window bounds in prompts.
pub fn format_timestamp_long(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}
