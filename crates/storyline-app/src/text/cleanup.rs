use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Lines whose first character is this marker are wiki section headers.
const MARKDOWN_HEADER_MARKER: char = '=';

/// How runs of tabs and spaces are collapsed after parenthetical fragments are
/// removed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WhitespaceCollapse {
    /// Every run of two or more tab/space characters becomes a single space.
    #[default]
    Runs,
    /// Each non-overlapping pair becomes a single space, in one pass. A run of
    /// three characters leaves two spaces behind.
    Pairs,
    /// Leave whitespace untouched.
    Off,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupOptions {
    pub whitespace_collapse: WhitespaceCollapse,
}

impl CleanupOptions {
    pub const fn new(whitespace_collapse: WhitespaceCollapse) -> Self {
        Self {
            whitespace_collapse,
        }
    }
}

/// Turns raw encyclopedia text into a single narration-ready string.
pub fn sanitize_text(raw: &str) -> String {
    sanitize_text_with_options(raw, CleanupOptions::default())
}

pub fn sanitize_text_with_options(raw: &str, options: CleanupOptions) -> String {
    let without_blank_lines = remove_blank_lines(raw);
    let without_markdown = remove_markdown(&without_blank_lines);
    remove_dates_in_parentheses(&without_markdown, options.whitespace_collapse)
}

/// Splits on `\n` and drops zero-length lines. Whitespace-only lines are kept.
pub fn remove_blank_lines(text: &str) -> Vec<&str> {
    text.split('\n').filter(|line| !line.is_empty()).collect()
}

/// Drops section header lines and joins the rest with a single space.
pub fn remove_markdown<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.starts_with(MARKDOWN_HEADER_MARKER))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Removes parenthetical date/citation fragments such as `(born 1900, died
/// 1990)` and collapses the whitespace left behind.
pub fn remove_dates_in_parentheses(text: &str, collapse: WhitespaceCollapse) -> String {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\([0-9A-Za-z,–\-./\t ]+\)").expect("valid date regex"));
    let stripped = RE.replace_all(text, "");
    collapse_whitespace(&stripped, collapse)
}

fn collapse_whitespace(input: &str, collapse: WhitespaceCollapse) -> String {
    static RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t ]+[\t ]").expect("valid run regex"));
    static PAIRS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t ]{2}").expect("valid pair regex"));

    match collapse {
        WhitespaceCollapse::Runs => RUNS.replace_all(input, " ").into_owned(),
        WhitespaceCollapse::Pairs => PAIRS.replace_all(input, " ").into_owned(),
        WhitespaceCollapse::Off => input.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENARIO: &str =
        "Hello world.\n\n=Heading=\nDr. Smith (born 1900, died 1990) went home. He left.";

    #[test]
    fn blank_lines_are_dropped_but_whitespace_lines_survive() {
        let lines = remove_blank_lines("a\n\n \n\nb\n");
        assert_eq!(lines, vec!["a", " ", "b"]);
    }

    #[test]
    fn scenario_line_filter() {
        assert_eq!(
            remove_blank_lines(SCENARIO),
            vec![
                "Hello world.",
                "=Heading=",
                "Dr. Smith (born 1900, died 1990) went home. He left."
            ]
        );
    }

    #[test]
    fn markdown_headers_are_removed_and_lines_joined() {
        let lines = remove_blank_lines(SCENARIO);
        assert_eq!(
            remove_markdown(&lines),
            "Hello world. Dr. Smith (born 1900, died 1990) went home. He left."
        );
    }

    #[test]
    fn markdown_filter_tolerates_empty_lines() {
        assert_eq!(remove_markdown(&["", "== History ==", "kept"]), " kept");
    }

    #[test]
    fn removes_parenthetical_dates() {
        let input = "Hello world. Dr. Smith (born 1900, died 1990) went home. He left.";
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Runs),
            "Hello world. Dr. Smith went home. He left."
        );
    }

    #[test]
    fn keeps_parentheses_with_other_punctuation() {
        let input = "Rust (the language; not the fungus) is fast.";
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Runs),
            input
        );
    }

    #[test]
    fn removes_en_dash_ranges() {
        let input = "Ada Lovelace (1815–1852) was a mathematician.";
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Runs),
            "Ada Lovelace was a mathematician."
        );
    }

    #[test]
    fn collapse_modes_differ_on_long_runs() {
        let input = "a   b\t\t\t\tc";
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Runs),
            "a b c"
        );
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Pairs),
            "a  b  c"
        );
        assert_eq!(
            remove_dates_in_parentheses(input, WhitespaceCollapse::Off),
            input
        );
    }

    #[test]
    fn sanitize_runs_all_filters() {
        assert_eq!(
            sanitize_text(SCENARIO),
            "Hello world. Dr. Smith went home. He left."
        );
    }

    #[test]
    fn collapse_mode_parses_from_config_strings() {
        assert_eq!("pairs".parse::<WhitespaceCollapse>(), Ok(WhitespaceCollapse::Pairs));
        assert_eq!(WhitespaceCollapse::Runs.as_ref(), "runs");
    }
}
