use std::path::PathBuf;

use thiserror::Error;

pub type ClipResult<T> = Result<T, ClipError>;

/// Everything that can stop a single playlist or archive request.
///
/// Every variant is terminal for the request that produced it.
#[derive(Error, Debug)]
pub enum ClipError {
    #[error("Too many columns on line {row} (found {found}, check commas!)")]
    TooManyColumns { row: usize, found: usize },

    #[error("Fewer than three columns on line {row} (found {found})")]
    TooFewColumns { row: usize, found: usize },

    #[error("Invalid time format '{input}' on line {row}. Enter time in H:M:S, or M:S")]
    InvalidTimeFormat { row: usize, input: String },

    #[error("Clip '{name}' on line {row} ends ({end}) before it starts ({start})")]
    InvalidRange {
        row: usize,
        name: String,
        start: String,
        end: String,
    },

    #[error("Clip on line {row} starts at {start}, the same time as the clip on line {first_row}")]
    DuplicateStart {
        row: usize,
        first_row: usize,
        start: String,
    },

    #[error("No clips were found in the CSV file!")]
    EmptyPlaylist,

    #[error("Clip '{name}' on line {row} is {seconds} seconds long; clips may be at most {max} seconds")]
    ClipTooLong {
        row: usize,
        name: String,
        seconds: u64,
        max: u64,
    },

    #[error("{tool} exited with status {}: {output}", status_label(.code))]
    ExternalToolFailure {
        tool: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Please supply the {field}")]
    MissingRequiredField { field: &'static str },

    #[error("Transcoder not found: {0}")]
    ToolNotFound(String),

    #[error("Could not read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Could not write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn status_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "unknown (terminated by signal)".to_string(),
    }
}

impl ClipError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClipError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable identifier for machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            ClipError::TooManyColumns { .. } | ClipError::TooFewColumns { .. } => {
                "clips.malformed_row"
            }
            ClipError::InvalidTimeFormat { .. } => "clips.invalid_time_format",
            ClipError::InvalidRange { .. } => "clips.invalid_range",
            ClipError::DuplicateStart { .. } => "clips.duplicate_start",
            ClipError::EmptyPlaylist => "clips.empty_playlist",
            ClipError::ClipTooLong { .. } => "clips.clip_too_long",
            ClipError::ExternalToolFailure { .. } => "clips.external_tool_failure",
            ClipError::MissingRequiredField { .. } => "clips.missing_required_field",
            ClipError::ToolNotFound(_) => "clips.tool_not_found",
            ClipError::Csv(_) => "clips.csv",
            ClipError::Archive(_) => "clips.archive",
            ClipError::Io { .. } => "clips.io",
        }
    }

    /// 1-based CSV line the error refers to, when there is one.
    pub fn row(&self) -> Option<usize> {
        match self {
            ClipError::TooManyColumns { row, .. }
            | ClipError::TooFewColumns { row, .. }
            | ClipError::InvalidTimeFormat { row, .. }
            | ClipError::InvalidRange { row, .. }
            | ClipError::DuplicateStart { row, .. }
            | ClipError::ClipTooLong { row, .. } => Some(*row),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_rows_share_a_code() {
        let many = ClipError::TooManyColumns { row: 3, found: 4 };
        let few = ClipError::TooFewColumns { row: 5, found: 2 };
        assert_eq!(many.code(), few.code());
        assert_eq!(many.code(), "clips.malformed_row");
        assert_eq!(many.row(), Some(3));
        assert_eq!(few.row(), Some(5));
    }

    #[test]
    fn messages_mention_the_line() {
        let err = ClipError::TooManyColumns { row: 7, found: 4 };
        assert_eq!(
            err.to_string(),
            "Too many columns on line 7 (found 4, check commas!)"
        );

        let err = ClipError::InvalidTimeFormat {
            row: 2,
            input: "1:2:3:4".to_string(),
        };
        assert!(err.to_string().contains("'1:2:3:4'"));
    }

    #[test]
    fn tool_failure_reports_status_and_output() {
        let err = ClipError::ExternalToolFailure {
            tool: "ffmpeg".to_string(),
            code: Some(1),
            output: "moov atom not found".to_string(),
        };
        assert_eq!(err.to_string(), "ffmpeg exited with status 1: moov atom not found");
        assert_eq!(err.code(), "clips.external_tool_failure");
        assert_eq!(err.row(), None);
    }
}
