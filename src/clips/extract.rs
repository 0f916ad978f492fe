use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use crate::ui::prelude::{Level, emit};

use super::error::{ClipError, ClipResult};

/// Cuts a segment out of a media file without re-encoding it.
pub trait SegmentExtractor {
    /// Copy `duration` of `source`, starting at `start`, into `dest`.
    ///
    /// Returns the path of the written segment.
    fn extract_segment(
        &self,
        source: &Path,
        start: Duration,
        duration: Duration,
        dest: &Path,
    ) -> ClipResult<PathBuf>;
}

/// Extractor backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegExtractor {
    program: PathBuf,
}

impl FfmpegExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use the configured binary, or find `ffmpeg` on `PATH`.
    pub fn locate(configured: Option<&str>) -> ClipResult<Self> {
        let wanted = configured.unwrap_or("ffmpeg");
        let program = which::which(wanted)
            .map_err(|err| ClipError::ToolNotFound(format!("{wanted}: {err}")))?;
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn segment_args(
        source: &Path,
        start: Duration,
        duration: Duration,
        dest: &Path,
    ) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-ss".to_string(),
            start.as_secs().to_string(),
            "-i".to_string(),
            source.to_string_lossy().into_owned(),
            "-t".to_string(),
            duration.as_secs().to_string(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            dest.to_string_lossy().into_owned(),
        ]
    }
}

impl SegmentExtractor for FfmpegExtractor {
    fn extract_segment(
        &self,
        source: &Path,
        start: Duration,
        duration: Duration,
        dest: &Path,
    ) -> ClipResult<PathBuf> {
        let args = Self::segment_args(source, start, duration, dest);
        emit(
            Level::Debug,
            "clips.extract.command",
            &format!("{} {}", self.program.display(), args.join(" ")),
            None,
        );

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|err| ClipError::io(&self.program, err))?;

        if !output.status.success() {
            let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
            combined.push_str(&String::from_utf8_lossy(&output.stderr));
            return Err(ClipError::ExternalToolFailure {
                tool: self.program.display().to_string(),
                code: output.status.code(),
                output: combined.trim().to_string(),
            });
        }

        Ok(dest.to_path_buf())
    }
}
