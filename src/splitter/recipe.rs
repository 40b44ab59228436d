use crate::cd::frames_to_seconds;
use crate::splitter::error::{SplitterError, SplitterResult};
use crate::splitter::resolver::ResolvedTrack;
use crate::util::sanitize;
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::path::Path;

lazy_static! {
    /// Encoder arguments per output format key. Opus stays at its native
    /// 48 kHz fullband rate, everything else is resampled to 44.1 kHz.
    static ref DATA_CODECS: HashMap<&'static str, &'static [&'static str]> = HashMap::from([
        ("wav", &["-c:a", "pcm_s16le", "-ar", "44100"][..]),
        ("flac", &["-c:a", "flac", "-ar", "44100"][..]),
        ("ogg", &["-c:a", "libvorbis", "-ar", "44100"][..]),
        ("opus", &["-c:a", "libopus"][..]),
        ("mp3", &["-c:a", "libmp3lame", "-ar", "44100"][..]),
    ]);
}

/// Full split instructions for one track: the ffmpeg invocation (command
/// included), the file name it produces and the expected length for
/// progress accounting.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub args: Vec<String>,
    pub output_name: String,
    pub duration: f64,
}

#[derive(Debug, Clone)]
pub struct RecipeBuilder {
    pub ffmpeg_cmd: String,
    pub loglevel: String,
    /// Output format key, or "copy" to keep the source container.
    pub format: String,
    pub extra_params: Vec<String>,
    pub report_progress: bool,
}

impl RecipeBuilder {
    /// Validates the output format once, then maps every resolved track to
    /// its ffmpeg invocation targeting `dest_dir`, in track order.
    pub fn build(&self, tracks: &[ResolvedTrack], dest_dir: &Path) -> SplitterResult<Vec<Recipe>> {
        if self.format != "copy" && !DATA_CODECS.contains_key(self.format.as_str()) {
            return Err(SplitterError::ConfigurationError(self.format.clone()));
        }

        Ok(tracks
            .iter()
            .map(|track| self.build_one(track, tracks, dest_dir))
            .collect())
    }

    fn build_one(&self, track: &ResolvedTrack, all: &[ResolvedTrack], dest_dir: &Path) -> Recipe {
        let group_len = all.iter().filter(|t| t.group == track.group).count();
        let suffix = self.suffix_for(track);

        let mut args = vec![
            self.ffmpeg_cmd.clone(),
            "-loglevel".to_string(),
            self.loglevel.clone(),
        ];
        if self.report_progress {
            args.extend(["-progress", "pipe:1", "-nostats", "-nostdin"].map(String::from));
        }

        args.push("-i".to_string());
        args.push(track.source.to_string_lossy().into_owned());
        args.push("-ss".to_string());
        args.push(format!("{:.6}", frames_to_seconds(track.start)));
        if let Some(end) = track.end {
            args.push("-to".to_string());
            args.push(format!("{:.6}", frames_to_seconds(end)));
        }

        for (key, value) in metadata(track, group_len) {
            args.push("-metadata".to_string());
            args.push(format!("{key}={value}"));
        }

        match self.format.as_str() {
            "copy" => args.extend(["-c", "copy"].map(String::from)),
            key => args.extend(DATA_CODECS[key].iter().map(|s| s.to_string())),
        }

        args.extend(self.extra_params.iter().cloned());
        args.push("-y".to_string());

        let output_name = format!(
            "{:02} - {}.{}",
            track.num,
            sanitize(track.tags.title()),
            suffix
        );
        args.push(dest_dir.join(&output_name).to_string_lossy().into_owned());

        Recipe {
            args,
            output_name,
            duration: track.duration,
        }
    }

    fn suffix_for(&self, track: &ResolvedTrack) -> String {
        if self.format == "copy" {
            track
                .source
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default()
                .to_string()
        } else {
            self.format.clone()
        }
    }
}

/// The tag set is always complete; fields the sheet never set are written
/// as empty strings rather than omitted.
fn metadata(track: &ResolvedTrack, group_len: usize) -> Vec<(&'static str, String)> {
    let tags = &track.tags;
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    vec![
        ("ARTIST", field(&tags.performer)),
        ("ALBUM", field(&tags.album)),
        ("TITLE", field(&tags.title)),
        ("TRACK", format!("{}/{group_len}", track.num)),
        (
            "DISCNUMBER",
            tags.extra.get("DISCNUMBER").cloned().unwrap_or_default(),
        ),
        ("GENRE", field(&tags.genre)),
        ("DATE", field(&tags.date)),
        ("COMMENT", field(&tags.comment)),
        ("DISCID", field(&tags.discid)),
    ]
}
