use std::fmt::Write;

use super::table::Clip;

pub const PLAYLIST_FILE_NAME: &str = "bookmarks.m3u";
pub const PLAYLIST_CONTENT_TYPE: &str = "text/enriched";

/// Duration written into `#EXTINF`; VLC ignores it for local files.
pub const DEFAULT_PLACEHOLDER_DURATION: u64 = 7061;

/// Extended M3U document holding VLC bookmarks for a single media file.
#[derive(Debug, Clone)]
pub struct BookmarkPlaylist<'a> {
    pub title: &'a str,
    pub media_path: &'a str,
    pub placeholder_duration: u64,
}

impl<'a> BookmarkPlaylist<'a> {
    pub fn new(title: &'a str, media_path: &'a str) -> Self {
        Self {
            title,
            media_path,
            placeholder_duration: DEFAULT_PLACEHOLDER_DURATION,
        }
    }

    pub fn with_placeholder_duration(mut self, seconds: u64) -> Self {
        self.placeholder_duration = seconds;
        self
    }

    /// Render the playlist. Clips are written in the order given.
    ///
    /// Labels are not escaped: a `,`, `{` or `}` in a label ends up in the
    /// bookmarks line as-is.
    pub fn render(&self, clips: &[Clip]) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#EXTM3U");
        let _ = writeln!(out, "#EXTINF:{},{}", self.placeholder_duration, self.title);

        let bookmarks: Vec<String> = clips.iter().map(bookmark).collect();
        let _ = writeln!(out, "#EXTVLCOPT:bookmarks={}", bookmarks.join(","));

        let _ = writeln!(out, "{}", self.media_path);
        out
    }
}

fn bookmark(clip: &Clip) -> String {
    format!("{{name={},time={}}}", clip.label, clip.start.as_secs())
}
