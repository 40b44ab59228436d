use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Splits the audio images referenced by CUE sheets into tagged per-track files
#[derive(Parser, Debug, Clone)]
#[command(
    long_about = "Splits the audio images referenced by CUE sheets into tagged per-track files\n\nNote: the heavy lifting is delegated to ffmpeg and ffprobe, which must be installed or pointed at via --ffmpeg-cmd / --ffprobe-cmd"
)]
pub struct SplitCommand {
    /// CUE sheet files and/or directories to scan for them
    #[arg(value_name = "INPUT", required = true, num_args = 1..)]
    pub input: Vec<PathBuf>,

    /// Also search sub-directories of the given directories
    #[arg(long, short = 'r', default_value_t = false)]
    pub recursive: bool,

    /// Audio format to output; "copy" keeps the source container as-is
    #[arg(long, short = 'f', value_name = "FORMAT", default_value = "flac")]
    pub output_format: String,

    /// Destination directory; "." means next to the CUE sheet
    #[arg(long, short = 'o', value_name = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Create additional sub-directories for audio collections
    #[arg(long, short = 'c', value_enum, value_name = "LAYOUT")]
    pub collection: Option<CollectionLayout>,

    /// Policy for files already present in the destination
    #[arg(long, value_enum, value_name = "POLICY", default_value_t = OverwritePolicy::Ask)]
    pub overwrite: OverwritePolicy,

    /// Character encoding of the CUE sheet (a label such as ISO-8859-1), UTF-8 when omitted
    #[arg(long, value_name = "ENCODING")]
    pub characters_encoding: Option<String>,

    /// Remove the CUE sheet and source audio files after a successful split
    #[arg(long, default_value_t = false)]
    pub del_orig_files: bool,

    /// ffmpeg command name or absolute path
    #[arg(long, value_name = "CMD", default_value = "ffmpeg")]
    pub ffmpeg_cmd: String,

    /// Log level passed to ffmpeg
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        value_parser = ["error", "warning", "info", "verbose", "debug"]
    )]
    pub ffmpeg_loglevel: String,

    /// Additional ffmpeg parameters, quoted as one string
    #[arg(long, value_name = "PARAMS")]
    pub ffmpeg_add_params: Option<String>,

    /// ffprobe command name or absolute path
    #[arg(long, value_name = "CMD", default_value = "ffprobe")]
    pub ffprobe_cmd: String,

    /// Progress meter mode
    #[arg(long, short = 'p', value_enum, value_name = "MODE", default_value_t = ProgressMode::Bar)]
    pub progress_meter: ProgressMode,

    /// Show the ffmpeg commands without touching the filesystem
    #[arg(long, default_value_t = false)]
    pub dry: bool,
}

/// Sub-directory layout under the output directory, built from the
/// sanitized disc metadata.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionLayout {
    /// <performer>/<album>
    #[value(name = "author+album")]
    AuthorAlbum,
    /// <performer>
    Author,
    /// <album>
    Album,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Prompt per existing file
    Ask,
    /// Skip the sheet when any output file already exists
    Never,
    /// Overwrite without asking
    Always,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    /// Per-track progress bar fed by ffmpeg's progress reports
    Bar,
    /// Let ffmpeg write to the console directly
    Plain,
}
