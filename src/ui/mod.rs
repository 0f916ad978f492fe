use colored::*;
use serde::Serialize;
use std::io::{self, Write};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    Debug,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Debug => "debug",
        }
    }

    fn to_stderr(self) -> bool {
        matches!(self, Level::Error | Level::Warn | Level::Debug)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    pub format: OutputFormat,
    pub color: bool,
    /// Set while an artifact is being streamed to stdout.
    pub stdout_reserved: bool,
}

static RENDERER: RwLock<Renderer> = RwLock::new(Renderer {
    format: OutputFormat::Text,
    color: true,
    stdout_reserved: false,
});

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_enabled() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub fn init(format: OutputFormat, color: bool) {
    if let Ok(mut r) = RENDERER.write() {
        r.format = format;
        r.color = color;
    }
}

/// Send every event to stderr from now on.
pub fn reserve_stdout() {
    if let Ok(mut r) = RENDERER.write() {
        r.stdout_reserved = true;
    }
}

fn renderer() -> Renderer {
    match RENDERER.read() {
        Ok(r) => *r,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

#[derive(Serialize)]
struct Event<'a> {
    level: &'a str,
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

fn colorize(level: Level, s: &str, enable: bool) -> String {
    if !enable {
        return s.to_string();
    }
    match level {
        Level::Info => s.normal().to_string(),
        Level::Success => s.green().bold().to_string(),
        Level::Warn => s.yellow().bold().to_string(),
        Level::Error => s.red().bold().to_string(),
        Level::Debug => s.cyan().to_string(),
    }
}

fn render_event(
    level: Level,
    code: &str,
    message: &str,
    data: Option<serde_json::Value>,
) -> String {
    let ev = Event {
        level: level.as_str(),
        code,
        message,
        data,
    };
    serde_json::to_string(&ev).unwrap_or_else(|_| message.to_string())
}

/// Report a progress or result event. Debug events need `--debug`.
pub fn emit(level: Level, code: &str, message: &str, data: Option<serde_json::Value>) {
    if level == Level::Debug && !is_debug_enabled() {
        return;
    }

    let r = renderer();
    let line = match r.format {
        OutputFormat::Text => colorize(level, message, r.color),
        OutputFormat::Json => render_event(level, code, message, data),
    };

    let mut out: Box<dyn Write> = if level.to_stderr() || r.stdout_reserved {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    };
    let _ = writeln!(out, "{}", line);
}

pub fn get_output_format() -> OutputFormat {
    renderer().format
}

pub mod prelude {
    pub use super::{Level, OutputFormat, emit, get_output_format, reserve_stdout};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_events_carry_code_and_data() {
        let line = render_event(
            Level::Error,
            "clips.invalid_range",
            "Clip ends before it starts",
            Some(serde_json::json!({ "row": 4 })),
        );
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["code"], "clips.invalid_range");
        assert_eq!(value["data"]["row"], 4);
    }

    #[test]
    fn json_events_omit_missing_data() {
        let line = render_event(Level::Success, "clips.done", "ok", None);
        assert!(!line.contains("data"));
    }

    #[test]
    fn plain_text_when_color_disabled() {
        assert_eq!(colorize(Level::Error, "boom", false), "boom");
    }
}
