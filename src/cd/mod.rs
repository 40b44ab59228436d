use crate::cd::error::{CdError, CdResult};
use lazy_static::lazy_static;
use regex::Regex;

pub mod error;

pub const SAMPLE_RATE: u64 = 44100;
pub const FRAMES_PER_SECOND: u64 = 75;
pub const SAMPLES_PER_FRAME: u64 = SAMPLE_RATE / FRAMES_PER_SECOND;

lazy_static! {
    static ref TIMECODE: Regex = Regex::new(r"^(\d+):(\d+):(\d+)$").expect("valid timecode regex");
}

/// Converts a `MM:SS:FF` disc position into a frame count at 44.1 kHz.
///
/// One CD-DA frame is 1/75 of a second, so the frame count equals the
/// sample offset of the position in the decoded stream.
pub fn timecode_to_frames(pos: &str) -> CdResult<u64> {
    let malformed = || CdError::MalformedTimecode(pos.to_string());

    let caps = TIMECODE.captures(pos).ok_or_else(|| malformed())?;

    let minutes: u64 = caps[1].parse().map_err(|_| malformed())?;
    let seconds: u64 = caps[2].parse().map_err(|_| malformed())?;
    let frames: u64 = caps[3].parse().map_err(|_| malformed())?;

    if frames >= FRAMES_PER_SECOND {
        return Err(malformed());
    }

    Ok((minutes * 60 + seconds) * SAMPLE_RATE + frames * SAMPLES_PER_FRAME)
}

pub fn frames_to_seconds(frames: u64) -> f64 {
    frames as f64 / SAMPLE_RATE as f64
}

/// Renders a frame count as a `H:MM:SS` duration, for log output only.
pub fn frames_to_duration_string(frames: u64) -> String {
    let secs = frames / SAMPLE_RATE;
    format!("{}:{:02}:{:02}", secs / 3600, secs % 3600 / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timecode_converts_to_frames() {
        assert_eq!(timecode_to_frames("00:00:00").unwrap(), 0);
        assert_eq!(timecode_to_frames("00:02:00").unwrap(), 88200);
        assert_eq!(timecode_to_frames("00:04:00").unwrap(), 176400);
        assert_eq!(timecode_to_frames("01:30:00").unwrap(), 3969000);
        assert_eq!(timecode_to_frames("00:00:01").unwrap(), 588);
        assert_eq!(timecode_to_frames("00:00:74").unwrap(), 74 * 588);
    }

    #[test]
    fn timecode_allows_seconds_beyond_sixty() {
        // Some sheets carry un-normalized positions like 00:90:00.
        assert_eq!(timecode_to_frames("00:90:00").unwrap(), 90 * 44100);
    }

    #[test]
    fn timecode_rejects_out_of_range_frame_field() {
        assert!(matches!(
            timecode_to_frames("00:00:75"),
            Err(CdError::MalformedTimecode(_))
        ));
    }

    #[test]
    fn timecode_rejects_malformed_input() {
        for bad in ["", "1:2", "a:b:c", "00:02", "00:02:00:00", "-1:00:00", "0:0: 0"] {
            assert!(
                matches!(timecode_to_frames(bad), Err(CdError::MalformedTimecode(_))),
                "expected rejection of {bad:?}"
            );
        }
    }

    #[test]
    fn frames_convert_to_seconds() {
        assert_eq!(frames_to_seconds(88200), 2.0);
        assert_eq!(frames_to_seconds(0), 0.0);
        assert_eq!(frames_to_seconds(22050), 0.5);
    }

    #[test]
    fn frames_format_as_duration_string() {
        assert_eq!(frames_to_duration_string(0), "0:00:00");
        assert_eq!(frames_to_duration_string(10407600), "0:03:56");
        assert_eq!(frames_to_duration_string(44100 * 3661), "1:01:01");
    }
}
