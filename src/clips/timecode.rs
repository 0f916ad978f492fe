use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid time format '{input}'. Enter time in H:M:S, or M:S")]
pub struct TimecodeError {
    pub input: String,
}

/// Accepted timecode layouts, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimecodeFormat {
    HoursMinutesSeconds,
    MinutesSeconds,
}

impl TimecodeFormat {
    const ALL: [TimecodeFormat; 2] = [
        TimecodeFormat::HoursMinutesSeconds,
        TimecodeFormat::MinutesSeconds,
    ];

    /// Upper bound for each field, most significant first.
    fn limits(self) -> &'static [u64] {
        match self {
            TimecodeFormat::HoursMinutesSeconds => &[23, 59, 59],
            TimecodeFormat::MinutesSeconds => &[59, 59],
        }
    }

    fn parse(self, value: &str) -> Option<Duration> {
        let limits = self.limits();
        let fields: Vec<&str> = value.split(':').collect();
        if fields.len() != limits.len() {
            return None;
        }

        let mut total = 0u64;
        for (field, limit) in fields.iter().zip(limits) {
            let number = parse_field(field)?;
            if number > *limit {
                return None;
            }
            total = total * 60 + number;
        }

        Some(Duration::from_secs(total))
    }
}

// One or two ASCII digits, like a strptime numeric directive.
fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Resolve an `H:M:S` or `M:S` timecode into an offset from the start of the media.
pub fn parse_timecode(value: &str) -> Result<Duration, TimecodeError> {
    TimecodeFormat::ALL
        .iter()
        .find_map(|format| format.parse(value))
        .ok_or_else(|| TimecodeError {
            input: value.to_string(),
        })
}

/// Render an offset as `H:MM:SS`.
pub fn format_timecode(offset: Duration) -> String {
    let total = offset.as_secs();
    format!("{}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
