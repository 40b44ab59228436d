use crate::cd::timecode_to_frames;
use crate::cue::context::Tags;
use crate::cue::error::{CueError, CueResult};
use crate::cue::models::{CueSheet, SourceFile, Track};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use std::path::{Path, PathBuf};

pub mod context;
pub mod error;
pub mod models;

/// Context the next metadata command applies to. FILE and TRACK commands
/// move it forward through the sheet, it never moves back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Disc,
    File,
    Track,
}

#[derive(Debug)]
pub struct CueParser {
    lines: Vec<String>,
}

impl CueParser {
    /// Expects trimmed, non-empty sheet lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// Reads a sheet from disk, decoding with the given encoding (UTF-8 when
    /// `None`). Undecodable input is retried once as UTF-8 before giving up.
    pub async fn from_file(
        path: impl AsRef<Path>,
        encoding: Option<&'static Encoding>,
    ) -> CueResult<Self> {
        let data = tokio::fs::read(path.as_ref()).await?;
        let encoding = encoding.unwrap_or(UTF_8);

        let text = match decode(&data, encoding) {
            Some(text) => text,
            None => {
                debug!("Decoding as {} failed, retrying as UTF-8", encoding.name());
                decode(&data, UTF_8).ok_or_else(|| {
                    CueError::ParseError(format!(
                        "Unable to read data from CUE file {:?}, please provide a correct encoding",
                        path.as_ref()
                    ))
                })?
            }
        };

        Ok(Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        ))
    }

    pub fn run(&self) -> CueResult<CueSheet> {
        let mut sheet = CueSheet {
            disc: Tags::disc(),
            files: Vec::new(),
        };
        let mut active = Active::Disc;

        for line in &self.lines {
            let (cmd, args) = tokenize(line);

            match cmd {
                "REM" => {
                    let (sub, subargs) = tokenize(args);
                    apply(&mut sheet, active, sub, subargs)?;
                }
                "FILE" => {
                    let (path, ftype) = args.rsplit_once(' ').ok_or_else(|| {
                        CueError::ParseError(format!("FILE command without a type tag: {line}"))
                    })?;
                    sheet.files.push(SourceFile {
                        path: PathBuf::from(unquote(path)),
                        file_type: ftype.to_string(),
                        tags: Tags::seed_file(&sheet.disc),
                        tracks: Vec::new(),
                    });
                    active = Active::File;
                }
                "TRACK" => {
                    let (num, dtype) = args.split_once(' ').unwrap_or((args, ""));
                    let num: u32 = num.parse()?;
                    let file = sheet.files.last_mut().ok_or_else(|| {
                        CueError::ParseError(format!(
                            "TRACK {num} appears before any FILE command"
                        ))
                    })?;
                    let tags = Tags::seed_track(&file.tags, num);
                    file.tracks.push(Track {
                        num,
                        track_type: dtype.to_string(),
                        start: 0,
                        tags,
                    });
                    active = Active::Track;
                }
                "INDEX" => {
                    let (num, pos) = args.split_once(' ').ok_or_else(|| {
                        CueError::ParseError(format!("INDEX command without a position: {line}"))
                    })?;
                    let track = sheet
                        .files
                        .last_mut()
                        .and_then(|file| file.tracks.last_mut())
                        .ok_or_else(|| {
                            CueError::ParseError(format!("INDEX {num} appears outside of a track"))
                        })?;
                    // Only INDEX 01 marks the split point; pre-gap markers
                    // and higher sub-indices are skipped.
                    if num == "01" {
                        track.tags.add("INDEX 01", pos);
                        track.start = timecode_to_frames(pos)?;
                    }
                }
                _ => apply(&mut sheet, active, cmd, args)?,
            }
        }

        if sheet.track_count() == 0 {
            return Err(CueError::ParseError(
                "Sheet contains no tracks".to_string(),
            ));
        }

        Ok(sheet)
    }
}

fn apply(sheet: &mut CueSheet, active: Active, key: &str, value: &str) -> CueResult<()> {
    let missing =
        || CueError::ParseError(format!("Metadata command {key} outside of its context"));

    match active {
        Active::Disc => {
            // The top-level TITLE command names the album, not a track.
            let key = if key == "TITLE" { "ALBUM" } else { key };
            sheet.disc.add(key, value);
        }
        Active::File => {
            sheet.files.last_mut().ok_or_else(missing)?.tags.add(key, value);
        }
        Active::Track => {
            sheet
                .files
                .last_mut()
                .and_then(|file| file.tracks.last_mut())
                .ok_or_else(missing)?
                .tags
                .add(key, value);
        }
    }

    Ok(())
}

/// Splits a sheet line into its command and the remaining argument string,
/// with surrounding whitespace and double quotes stripped from the argument.
fn tokenize(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((cmd, args)) => (cmd, unquote(args)),
        None => (line, ""),
    }
}

fn unquote(val: &str) -> &str {
    val.trim_matches(|c: char| c == ' ' || c == '"')
}

fn decode(data: &[u8], encoding: &'static Encoding) -> Option<String> {
    let (text, _, had_errors) = encoding.decode(data);
    if had_errors { None } else { Some(text.into_owned()) }
}
