use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::clips::playlist::DEFAULT_PLACEHOLDER_DURATION;
use crate::clips::table::DuplicatePolicy;

/// Get the clipmark config directory
pub fn clipmark_config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Unable to determine user config directory")?
        .join("clipmark");

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("creating config directory at {}", config_dir.display()))?;

    Ok(config_dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(clipmark_config_dir()?.join("config.toml"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipmarkConfig {
    /// Longest clip (in seconds) that may be cut into the archive
    pub max_clip_seconds: u64,
    /// Duration written into the playlist's #EXTINF line
    pub placeholder_duration: u64,
    /// What to do when two rows start at the same time (keep-last or reject)
    pub duplicate_policy: DuplicatePolicy,
    /// Prefix playlist bookmark names with their time range
    pub time_range_labels: bool,
    /// Transcoder binary; looked up on PATH when unset
    pub ffmpeg_path: Option<String>,
    /// Directory that relative clip sources are resolved against
    pub media_root: Option<PathBuf>,
    /// Example media path that counts as "not filled in"
    pub placeholder_media_path: Option<String>,
}

impl Default for ClipmarkConfig {
    fn default() -> Self {
        Self {
            max_clip_seconds: Self::DEFAULT_MAX_CLIP_SECONDS,
            placeholder_duration: DEFAULT_PLACEHOLDER_DURATION,
            duplicate_policy: DuplicatePolicy::default(),
            time_range_labels: true,
            ffmpeg_path: None,
            media_root: None,
            placeholder_media_path: None,
        }
    }
}

impl ClipmarkConfig {
    pub const DEFAULT_MAX_CLIP_SECONDS: u64 = 600;

    pub fn load() -> Result<Self> {
        Self::load_from_path(config_path()?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            let config = Self::default();
            config.save_to_path(path)?;
            return Ok(config);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading clipmark config from {}", path.display()))?;
        let mut config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing clipmark config {}", path.display()))?;
        if config.max_clip_seconds == 0 {
            config.max_clip_seconds = Self::DEFAULT_MAX_CLIP_SECONDS;
        }
        Ok(config)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("creating clipmark config directory {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self).context("serializing clipmark config")?;
        fs::write(path, toml)
            .with_context(|| format!("writing clipmark config to {}", path.display()))?;
        Ok(())
    }

    pub fn max_clip(&self) -> Duration {
        Duration::from_secs(self.max_clip_seconds)
    }

    /// Whether `path` is the example value shipped with the upload form.
    pub fn is_placeholder_media_path(&self, path: &str) -> bool {
        self.placeholder_media_path
            .as_deref()
            .is_some_and(|placeholder| placeholder == path)
    }

    /// Resolve a clip source against `media_root` when it is relative.
    pub fn resolve_media_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        match &self.media_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
