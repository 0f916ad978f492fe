use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::{ContentArrangement, Table};
use serde_json::json;

use crate::clips::request::{Artifact, OutputMode, Request, process, resolve_clips};
use crate::clips::table::Clip;
use crate::clips::timecode::format_timecode;
use crate::config::{ClipmarkConfig, config_path};
use crate::response::{write_attachment, write_html_error};
use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format, reserve_stdout};

use crate::cli::{CheckArgs, ClipsArgs, Commands, ConfigArgs, CsvInput, OutputArgs, PlaylistArgs};

const STDIO_PATH: &str = "-";

pub fn handle_command(command: Commands, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Playlist(args) => handle_playlist(args, &load_config(config_override)?),
        Commands::Clips(args) => handle_clips(args, &load_config(config_override)?),
        Commands::Check(args) => handle_check(args, &load_config(config_override)?),
        Commands::Config(args) => handle_config(&args, config_override),
    }
}

fn load_config(config_override: Option<PathBuf>) -> Result<ClipmarkConfig> {
    match config_override {
        Some(path) => ClipmarkConfig::load_from_path(path),
        None => ClipmarkConfig::load(),
    }
}

fn handle_playlist(args: PlaylistArgs, config: &ClipmarkConfig) -> Result<()> {
    let request = Request {
        title: args.title,
        media_path: args.movie_path,
        mode: OutputMode::Playlist,
        order: args.input.order,
    };
    run_request(&request, &args.input, &args.output, config)
}

fn handle_clips(args: ClipsArgs, config: &ClipmarkConfig) -> Result<()> {
    let request = Request {
        title: String::new(),
        media_path: args.source,
        mode: OutputMode::Clips,
        order: args.input.order,
    };
    run_request(&request, &args.input, &args.output, config)
}

fn run_request(
    request: &Request,
    input: &CsvInput,
    output: &OutputArgs,
    config: &ClipmarkConfig,
) -> Result<()> {
    if output.cgi || is_stdio(output.out_file.as_deref()) {
        reserve_stdout();
    }

    let result = read_csv_payload(&input.csv)
        .and_then(|csv| process(request, &csv, config, None).map_err(anyhow::Error::from));

    match result {
        Ok(artifact) => deliver(&artifact, output),
        Err(err) if output.cgi => {
            emit(Level::Error, "clipmark.cgi.error", &format!("{err:#}"), None);
            let stdout = io::stdout();
            write_html_error(&mut stdout.lock(), &format!("{err:#}"))
                .context("Failed to write CGI error page")
        }
        Err(err) => Err(err),
    }
}

fn deliver(artifact: &Artifact, output: &OutputArgs) -> Result<()> {
    if output.cgi {
        let stdout = io::stdout();
        write_attachment(&mut stdout.lock(), artifact).context("Failed to write CGI response")?;
        return Ok(());
    }

    let target = output
        .out_file
        .clone()
        .unwrap_or_else(|| PathBuf::from(artifact.file_name));

    if is_stdio(Some(target.as_path())) {
        let stdout = io::stdout();
        let mut lock = stdout.lock();
        artifact
            .body
            .write_to(&mut lock)
            .and_then(|_| lock.flush())
            .context("Failed to write to stdout")?;
    } else {
        prepare_output_destination(&target, output.force)?;
        File::create(&target)
            .and_then(|mut file| artifact.body.write_to(&mut file))
            .with_context(|| format!("Failed to write {}", target.display()))?;
    }

    emit(
        Level::Success,
        "clipmark.artifact.written",
        &format!(
            "Wrote {} clip(s) to {}",
            artifact.clip_count,
            target.display()
        ),
        Some(json!({
            "path": target.to_string_lossy(),
            "clips": artifact.clip_count,
            "content_type": artifact.content_type,
        })),
    );
    Ok(())
}

fn prepare_output_destination(output_path: &Path, force: bool) -> Result<()> {
    if output_path.exists() {
        if force {
            fs::remove_file(output_path).with_context(|| {
                format!(
                    "Failed to remove existing output file {} before overwrite",
                    output_path.display()
                )
            })?;
        } else {
            bail!(
                "Output file {} already exists. Use --force to overwrite.",
                output_path.display()
            );
        }
    }

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory {}", parent.display())
            })?;
        }
    }

    Ok(())
}

fn handle_check(args: CheckArgs, config: &ClipmarkConfig) -> Result<()> {
    let csv = read_csv_payload(&args.input.csv)?;
    let mode = if args.clips {
        OutputMode::Clips
    } else {
        OutputMode::Playlist
    };
    let clips = resolve_clips(&csv, mode, args.input.order, config)?;

    let total: u64 = clips.iter().map(|clip| clip.duration().as_secs()).sum();
    let data = json!({
        "clips": clips.iter().map(clip_json).collect::<Vec<_>>(),
        "total_seconds": total,
    });

    if get_output_format() == OutputFormat::Text {
        println!("{}", clip_table(&clips));
    }

    emit(
        Level::Success,
        "clipmark.check.valid",
        &format!(
            "{} is valid: {} clip(s), {} in total",
            args.input.csv.display(),
            clips.len(),
            format_timecode(std::time::Duration::from_secs(total))
        ),
        Some(data),
    );
    Ok(())
}

fn clip_table(clips: &[Clip]) -> Table {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Line", "Start", "End", "Length", "Label"]);
    for clip in clips {
        table.add_row(vec![
            clip.line.to_string(),
            format_timecode(clip.start),
            format_timecode(clip.end),
            format!("{}s", clip.duration().as_secs()),
            clip.label.clone(),
        ]);
    }
    table
}

fn clip_json(clip: &Clip) -> serde_json::Value {
    json!({
        "line": clip.line,
        "start": clip.start.as_secs(),
        "end": clip.end.as_secs(),
        "label": clip.label,
    })
}

fn handle_config(args: &ConfigArgs, config_override: Option<PathBuf>) -> Result<()> {
    let path = match config_override {
        Some(path) => path,
        None => config_path()?,
    };

    if args.path {
        println!("{}", path.display());
        return Ok(());
    }

    let config = ClipmarkConfig::load_from_path(&path)?;
    let toml = toml::to_string_pretty(&config).context("serializing clipmark config")?;
    emit(
        Level::Info,
        "clipmark.config.path",
        &format!("# {}", path.display()),
        None,
    );
    print!("{toml}");
    Ok(())
}

fn is_stdio(path: Option<&Path>) -> bool {
    path.is_some_and(|path| path == Path::new(STDIO_PATH))
}

fn read_csv_payload(path: &Path) -> Result<Vec<u8>> {
    if is_stdio(Some(path)) {
        let mut buffer = Vec::new();
        io::stdin()
            .read_to_end(&mut buffer)
            .context("Failed to read CSV from stdin")?;
        return Ok(buffer);
    }

    fs::read(path).with_context(|| format!("Failed to read CSV file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_output_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookmarks.m3u");
        fs::write(&path, "old").unwrap();

        let err = prepare_output_destination(&path, false).unwrap_err();
        assert!(err.to_string().contains("--force"));

        prepare_output_destination(&path, true).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn output_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("clips.zip");
        prepare_output_destination(&path, false).unwrap();
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn dash_means_stdio() {
        assert!(is_stdio(Some(Path::new("-"))));
        assert!(!is_stdio(Some(Path::new("clips.csv"))));
        assert!(!is_stdio(None));
    }

    #[test]
    fn check_table_lists_every_clip() {
        let clips = resolve_clips(
            b"0:10,0:20,Intro\n0:00,0:05,Cold Open\n",
            OutputMode::Clips,
            crate::clips::table::ClipOrder::Chronological,
            &ClipmarkConfig::default(),
        )
        .unwrap();
        let rendered = clip_table(&clips).to_string();
        let cold_open = rendered.find("Cold Open").unwrap();
        let intro = rendered.find("Intro").unwrap();
        assert!(cold_open < intro);
        assert!(rendered.contains("0:00:10"));
    }
}
