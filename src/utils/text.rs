// src/utils/text.rs

//! Text helpers used while extracting and presenting events.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("digit run pattern is valid"));

/// Parse the first contiguous run of ASCII digits in `s`.
///
/// Returns `None` when there are no digits or the run does not fit a `u64`.
pub fn first_digit_run(s: &str) -> Option<u64> {
    DIGIT_RUN.find(s)?.as_str().parse().ok()
}

/// Replace line breaks with single spaces, dropping blank lines and the
/// indentation around each line.
pub fn collapse_line_breaks(s: &str) -> String {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Title-case every word: first character upper-cased, the rest lower-cased.
pub fn title_case(s: &str) -> String {
    s.split_word_bounds()
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_alphanumeric() => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                _ => segment.to_string(),
            }
        })
        .collect()
}
