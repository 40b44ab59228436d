use lazy_static::lazy_static;
use regex::Regex;

pub mod fs;

lazy_static! {
    static ref ILLEGAL: Regex = Regex::new(r#"["*:<>?|]"#).expect("valid sanitize regex");
}

/// Makes a tag value safe to use as a file name on common filesystems.
///
/// Path separators become hyphens, characters popular filesystems reject
/// are dropped, whitespace runs collapse to single spaces and
/// leading/trailing whitespace and dots are trimmed. Idempotent: running it
/// twice never changes the result further.
pub fn sanitize(value: &str) -> String {
    let replaced = value.replace(['/', '\\'], "-");
    let stripped = ILLEGAL.replace_all(&replaced, "");
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == ' ' || c == '.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_path_separators() {
        assert_eq!(sanitize("AC/DC"), "AC-DC");
        assert_eq!(sanitize(r"a\b/c"), "a-b-c");
    }

    #[test]
    fn strips_illegal_characters() {
        assert_eq!(sanitize("What: Is <This>?"), "What Is This");
        assert_eq!(sanitize("\"quoted\" *starred* |piped|"), "quoted starred piped");
    }

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(sanitize("  too   many\tspaces  "), "too many spaces");
    }

    #[test]
    fn trims_leading_and_trailing_dots() {
        assert_eq!(sanitize("...hidden"), "hidden");
        assert_eq!(sanitize("name..."), "name");
        assert_eq!(sanitize("inner.dots.kept"), "inner.dots.kept");
    }

    #[test]
    fn sanitizing_is_idempotent() {
        let samples = [
            "AC/DC",
            "What: Is <This>?",
            "  too   many\tspaces  ",
            "...dots . everywhere ..",
            "plain name",
            "",
            " . ",
            "ü é ø 漢字",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn empty_results_stay_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("???"), "");
        assert_eq!(sanitize(" . . "), "");
    }
}
