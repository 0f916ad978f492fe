use std::io::{self, Write};
use std::path::Path;

use crate::config::ClipmarkConfig;
use crate::ui::prelude::{Level, emit};

use super::archive::{ARCHIVE_CONTENT_TYPE, ARCHIVE_FILE_NAME, ClipArchive, build_archive};
use super::csv_rows::parse_rows;
use super::error::{ClipError, ClipResult};
use super::extract::{FfmpegExtractor, SegmentExtractor};
use super::playlist::{BookmarkPlaylist, PLAYLIST_CONTENT_TYPE, PLAYLIST_FILE_NAME};
use super::table::{Clip, ClipOrder, ClipTable, TableOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// VLC bookmark playlist pointing at the media file
    Playlist,
    /// Zip of cut segments
    Clips,
}

/// One conversion request: what to build and from which media.
#[derive(Debug, Clone)]
pub struct Request {
    pub title: String,
    /// Path written into the playlist, or the file clips are cut from.
    pub media_path: Option<String>,
    pub mode: OutputMode,
    pub order: ClipOrder,
}

/// The single downloadable file a request produces.
#[derive(Debug)]
pub struct Artifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub body: ArtifactBody,
    pub clip_count: usize,
}

#[derive(Debug)]
pub enum ArtifactBody {
    Bytes(Vec<u8>),
    /// Zip still on disk; it is streamed out and removed on drop.
    Archive(ClipArchive),
}

impl ArtifactBody {
    pub fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self {
            ArtifactBody::Bytes(bytes) => out.write_all(bytes),
            ArtifactBody::Archive(archive) => archive.copy_to(out).map(|_| ()),
        }
    }
}

/// Parse and validate the CSV the way `mode` would, without producing output.
pub fn resolve_clips(
    csv: &[u8],
    mode: OutputMode,
    order: ClipOrder,
    config: &ClipmarkConfig,
) -> ClipResult<Vec<Clip>> {
    let rows = parse_rows(csv)?;
    let options = match mode {
        OutputMode::Playlist => TableOptions {
            time_range_labels: config.time_range_labels,
            duplicates: config.duplicate_policy,
            max_clip: None,
        },
        OutputMode::Clips => TableOptions {
            time_range_labels: false,
            duplicates: config.duplicate_policy,
            max_clip: Some(config.max_clip()),
        },
    };
    ClipTable::from_rows(&rows, &options)?.into_ordered(order)
}

/// Run a request start to finish.
///
/// `extractor` is only used in clips mode; when it is `None` the configured
/// (or `PATH`) ffmpeg is used.
pub fn process(
    request: &Request,
    csv: &[u8],
    config: &ClipmarkConfig,
    extractor: Option<&dyn SegmentExtractor>,
) -> ClipResult<Artifact> {
    let media_path = required_media_path(request, config)?;

    match request.mode {
        OutputMode::Playlist => {
            let clips = resolve_clips(csv, request.mode, request.order, config)?;
            let body = BookmarkPlaylist::new(&request.title, media_path)
                .with_placeholder_duration(config.placeholder_duration)
                .render(&clips);
            Ok(Artifact {
                file_name: PLAYLIST_FILE_NAME,
                content_type: PLAYLIST_CONTENT_TYPE,
                body: ArtifactBody::Bytes(body.into_bytes()),
                clip_count: clips.len(),
            })
        }
        OutputMode::Clips => {
            let source = config.resolve_media_path(media_path);
            let clips = resolve_clips(csv, request.mode, request.order, config)?;
            ensure_source_exists(&source)?;

            let located;
            let extractor: &dyn SegmentExtractor = match extractor {
                Some(extractor) => extractor,
                None => {
                    located = FfmpegExtractor::locate(config.ffmpeg_path.as_deref())?;
                    emit(
                        Level::Debug,
                        "clips.extract.tool",
                        &format!("Using {}", located.program().display()),
                        None,
                    );
                    &located
                }
            };

            let archive = build_archive(&clips, &source, extractor)?;
            emit(
                Level::Debug,
                "clips.archive.entries",
                &format!("Archive entries: {}", archive.entries().join(", ")),
                None,
            );
            Ok(Artifact {
                file_name: ARCHIVE_FILE_NAME,
                content_type: ARCHIVE_CONTENT_TYPE,
                body: ArtifactBody::Archive(archive),
                clip_count: clips.len(),
            })
        }
    }
}

fn required_media_path<'a>(request: &'a Request, config: &ClipmarkConfig) -> ClipResult<&'a str> {
    let field = match request.mode {
        OutputMode::Playlist => "path to your film",
        OutputMode::Clips => "source video to cut clips from",
    };
    match request.media_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() && !config.is_placeholder_media_path(path) => Ok(path),
        _ => Err(ClipError::MissingRequiredField { field }),
    }
}

fn ensure_source_exists(source: &Path) -> ClipResult<()> {
    if source.is_file() {
        Ok(())
    } else {
        Err(ClipError::io(
            source,
            std::io::Error::new(std::io::ErrorKind::NotFound, "source video does not exist"),
        ))
    }
}
