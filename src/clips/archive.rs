use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, Seek, Write};
use std::path::Path;

use tempfile::{NamedTempFile, TempDir};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ui::prelude::{Level, emit};

use super::error::{ClipError, ClipResult};
use super::extract::SegmentExtractor;
use super::table::Clip;

pub const ARCHIVE_FILE_NAME: &str = "clips.zip";
pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// Extension used when the source file has none; Matroska accepts any stream.
const FALLBACK_EXTENSION: &str = "mkv";

/// Make a label usable as a file name.
///
/// Path separators and colons become `-`, spaces become `_` and `?` is
/// dropped. This does not guard against every hostile name.
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        match ch {
            '/' | '\\' | ':' => out.push('-'),
            ' ' => out.push('_'),
            '?' => {}
            other => out.push(other),
        }
    }
    out
}

/// Finished archive on disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct ClipArchive {
    file: NamedTempFile,
    entries: Vec<String>,
}

impl ClipArchive {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Entry names, in archive order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Stream the archive into `out` without loading it into memory.
    pub fn copy_to<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<u64> {
        let mut file = File::open(self.path())?;
        io::copy(&mut file, out)
    }
}

/// Cut every clip out of `source` and bundle the segments into one zip.
///
/// Clips are extracted one at a time and each segment is moved into the
/// archive as soon as it is cut. The first failure abandons the whole archive.
/// Segments live in a scratch directory that is removed on every path.
pub fn build_archive(
    clips: &[Clip],
    source: &Path,
    extractor: &dyn SegmentExtractor,
) -> ClipResult<ClipArchive> {
    let workdir = TempDir::new().map_err(|err| ClipError::io(std::env::temp_dir(), err))?;
    let extension = extension_or_default(source, FALLBACK_EXTENSION);

    let mut file = NamedTempFile::new().map_err(|err| ClipError::io(std::env::temp_dir(), err))?;
    let mut zip = ZipWriter::new(file.as_file_mut());
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut names = EntryNames::default();
    let mut entries = Vec::with_capacity(clips.len());
    for (index, clip) in clips.iter().enumerate() {
        let entry = names.claim(clip, &extension);
        // Scratch files are numbered so labels differing only in case never collide.
        let scratch = workdir.path().join(format!("{}.{extension}", index + 1));
        emit(
            Level::Info,
            "clips.extract.segment",
            &format!(
                "Extracting '{}' ({}s from {}s)",
                clip.label,
                clip.duration().as_secs(),
                clip.start.as_secs()
            ),
            None,
        );
        let segment = extractor.extract_segment(source, clip.start, clip.duration(), &scratch)?;
        append_segment(&mut zip, &entry, &segment, options)?;
        entries.push(entry);
    }
    zip.finish()?;

    Ok(ClipArchive { file, entries })
}

/// Copy one segment into the archive and delete it.
fn append_segment<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    entry: &str,
    segment: &Path,
    options: SimpleFileOptions,
) -> ClipResult<()> {
    zip.start_file(entry, options)?;
    let mut file = File::open(segment).map_err(|err| ClipError::io(segment, err))?;
    io::copy(&mut file, zip).map_err(|err| ClipError::io(segment, err))?;
    drop(file);
    fs::remove_file(segment).map_err(|err| ClipError::io(segment, err))
}

fn extension_or_default(path: &Path, default: &str) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| default.to_string())
}

/// Hands out unique entry names so two clips never share a file.
#[derive(Default)]
struct EntryNames {
    used: HashSet<String>,
}

impl EntryNames {
    fn claim(&mut self, clip: &Clip, extension: &str) -> String {
        let mut stem = sanitize_label(&clip.label);
        if stem.is_empty() {
            stem = format!("clip-{}", clip.line);
        }

        let mut candidate = format!("{stem}.{extension}");
        let mut suffix = 2;
        while self.used.contains(&candidate) {
            candidate = format!("{stem}-{suffix}.{extension}");
            suffix += 1;
        }
        self.used.insert(candidate.clone());
        candidate
    }
}
