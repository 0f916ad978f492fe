use clap::{Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::clips::table::ClipOrder;

/// Turn a CSV of clip timecodes into VLC bookmarks or a zip of cut clips
#[derive(Parser, Debug)]
#[command(name = "clipmark", author, version, about, long_about = None)]
pub struct Cli {
    /// Show debug output (including transcoder command lines)
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Print events as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build a VLC bookmark playlist (bookmarks.m3u) for a film
    Playlist(PlaylistArgs),
    /// Cut every clip out of a video and bundle them into clips.zip
    Clips(ClipsArgs),
    /// Validate a clip CSV and show the resulting clips
    Check(CheckArgs),
    /// Show the active configuration
    Config(ConfigArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CsvInput {
    /// CSV file with `start,end,label` rows ("-" reads stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub csv: PathBuf,

    /// Clip order in the output
    #[arg(long, value_enum, default_value_t = ClipOrder::AsGiven)]
    pub order: ClipOrder,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output path; defaults to the artifact name in the current directory ("-" for stdout)
    #[arg(short = 'o', long = "out-file", value_hint = ValueHint::FilePath)]
    pub out_file: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    /// Write a CGI response (headers and body) to stdout
    #[arg(long, conflicts_with_all = ["out_file", "force"])]
    pub cgi: bool,
}

#[derive(Args, Debug, Clone)]
pub struct PlaylistArgs {
    #[command(flatten)]
    pub input: CsvInput,

    /// Film title shown by the player
    #[arg(short, long, default_value = "")]
    pub title: String,

    /// Full path of the film on the machine that will play it
    #[arg(short = 'm', long = "movie-path")]
    pub movie_path: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ClipsArgs {
    #[command(flatten)]
    pub input: CsvInput,

    /// Video to cut clips from (relative paths use `media_root` from the config)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub source: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: CsvInput,

    /// Apply clip extraction rules (maximum clip length, plain labels)
    #[arg(long)]
    pub clips: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print only the config file path
    #[arg(long)]
    pub path: bool,
}
