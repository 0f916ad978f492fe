mod cli;
mod clips;
mod commands;
mod config;
mod response;
mod ui;

use clap::Parser;
use serde_json::json;

use crate::cli::Cli;
use crate::clips::ClipError;
use crate::ui::prelude::{Level, OutputFormat, emit};

fn main() {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ui::init(format, !cli.no_color);
    ui::set_debug_mode(cli.debug);

    if let Err(err) = commands::handle_command(cli.command, cli.config) {
        let (code, data) = match err.downcast_ref::<ClipError>() {
            Some(clip_err) => (
                clip_err.code(),
                clip_err.row().map(|row| json!({ "row": row })),
            ),
            None => ("clipmark.error", None),
        };
        emit(Level::Error, code, &format!("Error: {err:#}"), data);
        std::process::exit(1);
    }
}
