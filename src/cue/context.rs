use std::collections::HashMap;

pub const UNKNOWN: &str = "Unknown";

/// Metadata carried by the disc, a source file or a track.
///
/// Well-known sheet keys live in typed fields; anything else (unrecognized
/// REM sub-commands, the raw `INDEX 01` position) lands in the overflow map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    pub album: Option<String>,
    pub performer: Option<String>,
    pub title: Option<String>,
    pub genre: Option<String>,
    pub date: Option<String>,
    pub comment: Option<String>,
    pub discid: Option<String>,
    pub track_num: Option<u32>,
    pub extra: HashMap<String, String>,
}

impl Tags {
    /// Disc-level seed. Album and performer start out as a sentinel, the
    /// date stays absent until the sheet provides one.
    pub fn disc() -> Self {
        Self {
            album: Some(UNKNOWN.to_string()),
            performer: Some(UNKNOWN.to_string()),
            ..Self::default()
        }
    }

    /// Snapshot of the parent context, taken when a FILE command opens a new
    /// source file. The clone is deep, later changes to the parent never
    /// reach the child.
    pub fn seed_file(parent: &Tags) -> Self {
        parent.clone()
    }

    /// Snapshot of the owning file's context, taken when a TRACK command
    /// opens a new track. The track number is synthesized immediately and
    /// the title falls back to the sentinel when no level above set one.
    pub fn seed_track(parent: &Tags, num: u32) -> Self {
        let mut tags = parent.clone();
        if tags.title.is_none() {
            tags.title = Some(UNKNOWN.to_string());
        }
        tags.track_num = Some(num);
        tags
    }

    pub fn add(&mut self, key: &str, value: &str) {
        match key {
            "ALBUM" => self.album = Some(value.to_string()),
            "PERFORMER" => self.performer = Some(value.to_string()),
            "TITLE" => self.title = Some(value.to_string()),
            "GENRE" => self.genre = Some(value.to_string()),
            "DATE" => self.date = Some(value.to_string()),
            "COMMENT" => self.comment = Some(value.to_string()),
            "DISCID" => self.discid = Some(value.to_string()),
            _ => {
                self.extra.insert(key.to_string(), value.to_string());
            }
        }
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNKNOWN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_seed_defaults() {
        let disc = Tags::disc();
        assert_eq!(disc.album.as_deref(), Some(UNKNOWN));
        assert_eq!(disc.performer.as_deref(), Some(UNKNOWN));
        assert_eq!(disc.date, None);
        assert_eq!(disc.title, None);
    }

    #[test]
    fn child_snapshot_is_independent_of_later_parent_changes() {
        let mut disc = Tags::disc();
        disc.add("GENRE", "Rock");

        let file = Tags::seed_file(&disc);
        disc.add("GENRE", "Jazz");

        assert_eq!(file.genre.as_deref(), Some("Rock"));
        assert_eq!(disc.genre.as_deref(), Some("Jazz"));
    }

    #[test]
    fn track_seed_synthesizes_number_and_title_fallback() {
        let file = Tags::disc();
        let track = Tags::seed_track(&file, 3);
        assert_eq!(track.track_num, Some(3));
        assert_eq!(track.title(), UNKNOWN);

        let mut titled = Tags::disc();
        titled.add("TITLE", "Side A");
        let track = Tags::seed_track(&titled, 1);
        assert_eq!(track.title(), "Side A");
    }

    #[test]
    fn unknown_keys_go_to_overflow() {
        let mut tags = Tags::default();
        tags.add("DISCNUMBER", "2");
        tags.add("REPLAYGAIN", "-3.5 dB");
        assert_eq!(tags.extra.get("DISCNUMBER").map(String::as_str), Some("2"));
        assert_eq!(tags.extra.get("REPLAYGAIN").map(String::as_str), Some("-3.5 dB"));
    }
}
