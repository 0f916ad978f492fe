use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ui::prelude::{Level, emit};

use super::csv_rows::RawRow;
use super::error::{ClipError, ClipResult};
use super::timecode::parse_timecode;

/// A validated clip: `[start, end)` within the source media.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clip {
    /// CSV line the clip came from.
    pub line: usize,
    pub start: Duration,
    pub end: Duration,
    /// Label as written in the CSV.
    pub name: String,
    /// Label shown to the user (bookmark name).
    pub label: String,
}

impl Clip {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Order in which clips are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClipOrder {
    /// Sorted by start time
    Chronological,
    /// Same order as the CSV rows
    #[default]
    AsGiven,
}

/// What to do when two rows share a start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// The later row replaces the earlier one but keeps its position.
    #[default]
    KeepLast,
    /// Fail the request.
    Reject,
}

#[derive(Debug, Clone, Default)]
pub struct TableOptions {
    /// Prefix labels with `start-end - `.
    pub time_range_labels: bool,
    pub duplicates: DuplicatePolicy,
    /// Longest clip allowed, if any.
    pub max_clip: Option<Duration>,
}

/// Clips keyed by start time, kept in CSV order.
#[derive(Debug, Clone, Default)]
pub struct ClipTable {
    clips: Vec<Clip>,
}

impl ClipTable {
    pub fn from_rows(rows: &[RawRow], options: &TableOptions) -> ClipResult<Self> {
        let mut clips: Vec<Clip> = Vec::with_capacity(rows.len());
        let mut by_start: HashMap<Duration, usize> = HashMap::new();

        for row in rows {
            let clip = resolve_row(row, options)?;
            match by_start.entry(clip.start) {
                Entry::Vacant(slot) => {
                    slot.insert(clips.len());
                    clips.push(clip);
                }
                Entry::Occupied(slot) => {
                    let existing = &mut clips[*slot.get()];
                    match options.duplicates {
                        DuplicatePolicy::KeepLast => {
                            emit(
                                Level::Warn,
                                "clips.table.duplicate_start",
                                &format!(
                                    "Line {} starts at the same time as line {}; keeping line {}",
                                    row.line, existing.line, row.line
                                ),
                                None,
                            );
                            *existing = clip;
                        }
                        DuplicatePolicy::Reject => {
                            return Err(ClipError::DuplicateStart {
                                row: row.line,
                                first_row: existing.line,
                                start: row.start.clone(),
                            });
                        }
                    }
                }
            }
        }

        if let Some(max) = options.max_clip {
            if let Some(clip) = clips.iter().find(|clip| clip.duration() > max) {
                return Err(ClipError::ClipTooLong {
                    row: clip.line,
                    name: clip.name.clone(),
                    seconds: clip.duration().as_secs(),
                    max: max.as_secs(),
                });
            }
        }

        Ok(Self { clips })
    }

    /// Final clip sequence. An empty table is an error in every output mode.
    pub fn into_ordered(self, order: ClipOrder) -> ClipResult<Vec<Clip>> {
        let mut clips = self.clips;
        if clips.is_empty() {
            return Err(ClipError::EmptyPlaylist);
        }
        if order == ClipOrder::Chronological {
            clips.sort_by_key(|clip| clip.start);
        }
        Ok(clips)
    }
}

fn resolve_row(row: &RawRow, options: &TableOptions) -> ClipResult<Clip> {
    let start = parse_timecode(&row.start).map_err(|err| ClipError::InvalidTimeFormat {
        row: row.line,
        input: err.input,
    })?;
    let end = parse_timecode(&row.end).map_err(|err| ClipError::InvalidTimeFormat {
        row: row.line,
        input: err.input,
    })?;

    if end < start {
        return Err(ClipError::InvalidRange {
            row: row.line,
            name: row.name.clone(),
            start: row.start.clone(),
            end: row.end.clone(),
        });
    }

    let label = if options.time_range_labels {
        format!("{}-{} - {}", row.start, row.end, row.name)
    } else {
        row.name.clone()
    };

    Ok(Clip {
        line: row.line,
        start,
        end,
        name: row.name.clone(),
        label,
    })
}
