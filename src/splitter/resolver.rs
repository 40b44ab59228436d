use crate::cd::frames_to_seconds;
use crate::cue::context::Tags;
use crate::cue::models::CueSheet;
use crate::splitter::error::{SplitterError, SplitterResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A track with computed boundaries, ready for recipe building.
#[derive(Debug, Clone)]
pub struct ResolvedTrack {
    pub num: u32,
    /// Position of the owning FILE entry in the sheet. Two FILE entries
    /// naming the same path keep distinct group indices.
    pub group: usize,
    /// Resolved absolute path of the source audio file.
    pub source: PathBuf,
    /// Start offset in frames.
    pub start: u64,
    /// End offset in frames; `None` means "play to the end of the source".
    pub end: Option<u64>,
    /// Expected length in seconds, always positive.
    pub duration: f64,
    pub tags: Tags,
}

/// Turns the parse tree into flat, ready-to-split track spans.
///
/// `durations` holds one probed total duration per source path that exists
/// on disk; files absent from the map were not found and their tracks are
/// skipped wholesale. Each group spans the whole probed stream, so a sheet
/// repeating the same path gets the full duration charged per FILE entry.
pub fn resolve_tracks(
    sheet: &CueSheet,
    cue_dir: &Path,
    durations: &HashMap<PathBuf, f64>,
) -> SplitterResult<Vec<ResolvedTrack>> {
    let mut resolved = Vec::new();

    for (group, file) in sheet.files.iter().enumerate() {
        let source = cue_dir.join(&file.path);
        let Some(&total) = durations.get(&source) else {
            continue;
        };

        let count = file.tracks.len();
        let mut elapsed = 0.0;

        for (idx, track) in file.tracks.iter().enumerate() {
            let next_start = file.tracks.get(idx + 1).map(|next| next.start);

            let duration = match next_start {
                Some(next) if next <= track.start => {
                    return Err(SplitterError::ResolutionError(format!(
                        "track {} of {:?} starts at frame {} but the next track starts at frame {next}",
                        track.num, file.path, track.start,
                    )));
                }
                Some(next) => frames_to_seconds(next - track.start),
                // The last track runs to the end of the stream: its length
                // is whatever the probe reported minus everything before it.
                None if count > 1 => total - elapsed,
                None => total - frames_to_seconds(track.start),
            };

            if duration <= 0.0 {
                return Err(SplitterError::ResolutionError(format!(
                    "track {} of {:?} resolves to a non-positive duration ({duration:.6}s)",
                    track.num, file.path,
                )));
            }

            elapsed += duration;
            resolved.push(ResolvedTrack {
                num: track.num,
                group,
                source: source.clone(),
                start: track.start,
                end: next_start,
                duration,
                tags: track.tags.clone(),
            });
        }
    }

    if resolved.is_empty() {
        let first = sheet
            .files
            .first()
            .map(|file| cue_dir.join(&file.path))
            .unwrap_or_default();
        return Err(SplitterError::NoSourceFound(first));
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue::CueParser;

    fn parse(lines: &[&str]) -> CueSheet {
        CueParser::new(lines.iter().map(|l| l.to_string()).collect())
            .run()
            .unwrap()
    }

    fn three_track_sheet() -> CueSheet {
        parse(&[
            "PERFORMER \"Someone\"",
            "TITLE \"An Album\"",
            "FILE \"img.wav\" WAVE",
            "TRACK 01 AUDIO",
            "TITLE \"First\"",
            "INDEX 01 00:00:00",
            "TRACK 02 AUDIO",
            "TITLE \"Second\"",
            "INDEX 01 00:02:00",
            "TRACK 03 AUDIO",
            "TITLE \"Third\"",
            "INDEX 01 00:04:00",
        ])
    }

    fn durations_for(cue_dir: &Path, sheet: &CueSheet, total: f64) -> HashMap<PathBuf, f64> {
        sheet
            .files
            .iter()
            .map(|file| (cue_dir.join(&file.path), total))
            .collect()
    }

    #[test]
    fn resolves_starts_ends_and_durations() {
        let cue_dir = Path::new("/music/rip");
        let sheet = three_track_sheet();
        let tracks =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, 6.0)).unwrap();

        assert_eq!(tracks.len(), 3);

        let starts: Vec<u64> = tracks.iter().map(|t| t.start).collect();
        assert_eq!(starts, [0, 88200, 176400]);

        let ends: Vec<Option<u64>> = tracks.iter().map(|t| t.end).collect();
        assert_eq!(ends, [Some(88200), Some(176400), None]);

        let durations: Vec<f64> = tracks.iter().map(|t| t.duration).collect();
        assert_eq!(durations, [2.0, 2.0, 2.0]);

        assert_eq!(tracks[0].source, PathBuf::from("/music/rip/img.wav"));
    }

    #[test]
    fn non_last_tracks_end_where_the_next_starts() {
        let cue_dir = Path::new("/music/rip");
        let sheet = three_track_sheet();
        let tracks =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, 300.0)).unwrap();

        for pair in tracks.windows(2) {
            assert_eq!(pair[0].end, Some(pair[1].start));
        }
    }

    #[test]
    fn group_durations_sum_to_the_probed_total() {
        let cue_dir = Path::new("/music/rip");
        let sheet = three_track_sheet();
        let total = 543.21;
        let tracks =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, total)).unwrap();

        let sum: f64 = tracks.iter().map(|t| t.duration).sum();
        assert!((sum - total).abs() < 1e-6);
    }

    #[test]
    fn probe_shorter_than_declared_starts_is_an_error() {
        let cue_dir = Path::new("/music/rip");
        let sheet = three_track_sheet();
        let err =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, 1.0)).unwrap_err();
        assert!(matches!(err, SplitterError::ResolutionError(_)));
    }

    #[test]
    fn non_monotonic_starts_are_an_error() {
        let cue_dir = Path::new("/music/rip");
        let sheet = parse(&[
            "FILE \"img.wav\" WAVE",
            "TRACK 01 AUDIO",
            "INDEX 01 00:04:00",
            "TRACK 02 AUDIO",
            "INDEX 01 00:02:00",
        ]);
        let err =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, 600.0)).unwrap_err();
        assert!(matches!(err, SplitterError::ResolutionError(_)));
    }

    #[test]
    fn single_track_group_spans_probe_minus_start() {
        let cue_dir = Path::new("/music/rip");
        let sheet = parse(&[
            "FILE \"img.wav\" WAVE",
            "TRACK 01 AUDIO",
            "INDEX 01 00:02:00",
        ]);
        let tracks =
            resolve_tracks(&sheet, cue_dir, &durations_for(cue_dir, &sheet, 10.0)).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].end, None);
        assert!((tracks[0].duration - 8.0).abs() < 1e-9);
    }

    #[test]
    fn missing_sources_are_skipped_and_empty_result_is_fatal() {
        let cue_dir = Path::new("/music/rip");
        let sheet = three_track_sheet();

        let err = resolve_tracks(&sheet, cue_dir, &HashMap::new()).unwrap_err();
        assert!(matches!(err, SplitterError::NoSourceFound(_)));
    }

    #[test]
    fn groups_stay_separate_per_file_entry() {
        let cue_dir = Path::new("/music/rip");
        let sheet = parse(&[
            "FILE \"a.wav\" WAVE",
            "TRACK 01 AUDIO",
            "INDEX 01 00:00:00",
            "TRACK 02 AUDIO",
            "INDEX 01 00:02:00",
            "FILE \"b.wav\" WAVE",
            "TRACK 03 AUDIO",
            "INDEX 01 00:00:00",
        ]);
        let durations = HashMap::from([
            (cue_dir.join("a.wav"), 4.0),
            (cue_dir.join("b.wav"), 3.5),
        ]);
        let tracks = resolve_tracks(&sheet, cue_dir, &durations).unwrap();

        assert_eq!(tracks.len(), 3);
        assert_eq!(tracks[0].group, 0);
        assert_eq!(tracks[2].group, 1);
        // Track 2 is last in its own group, it ends with file a.
        assert_eq!(tracks[1].end, None);
        assert_eq!(tracks[1].duration, 2.0);
        assert_eq!(tracks[2].duration, 3.5);
    }

    #[test]
    fn only_the_missing_file_is_dropped() {
        let cue_dir = Path::new("/music/rip");
        let sheet = parse(&[
            "FILE \"gone.wav\" WAVE",
            "TRACK 01 AUDIO",
            "INDEX 01 00:00:00",
            "FILE \"here.wav\" WAVE",
            "TRACK 02 AUDIO",
            "INDEX 01 00:00:00",
        ]);
        let durations = HashMap::from([(cue_dir.join("here.wav"), 5.0)]);
        let tracks = resolve_tracks(&sheet, cue_dir, &durations).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].num, 2);
        assert_eq!(tracks[0].source, cue_dir.join("here.wav"));
    }
}
