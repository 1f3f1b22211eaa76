//! Title normalization and the path segment similarity predicate.

use std::sync::LazyLock;

use regex::Regex;

/// Trailing year on an already normalized segment key, e.g. "foo 2021".
static RE_TRAILING_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>.*\S)\s+\d{4}$").expect("Failed to compile trailing year regex"));

/// Season folder, e.g. "Season 01", "season.2", "Season_10".
static RE_SEASON_FOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*season[\s._-]*(?P<season>\d{1,4})\s*$").expect("Failed to compile season folder regex")
});

/// Characters that are not allowed in file or directory names on common file systems.
const ILLEGAL_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Characters treated as word separators when comparing path segments.
const SEGMENT_SEPARATORS: &[char] = &['.', '_', '-', '(', ')', '[', ']'];

/// Normalize a captured title fragment for display.
///
/// Dots and underscores become spaces, whitespace runs collapse to one space,
/// and every word delimited by whitespace or a hyphen is title-cased.
/// Only ASCII letters change case. Normalizing twice gives the same result.
///
/// ```rust
/// use media_rename::media::normalize_title;
///
/// assert_eq!(normalize_title("breaking.bad."), "Breaking Bad");
/// assert_eq!(normalize_title("SPIDER-MAN_far  from home"), "Spider-Man Far From Home");
/// ```
#[must_use]
pub fn normalize_title(raw: &str) -> String {
    let spaced = raw.replace(['.', '_'], " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut result = String::with_capacity(collapsed.len());
    let mut word_start = true;
    for c in collapsed.chars() {
        if c == ' ' || c == '-' {
            result.push(c);
            word_start = true;
        } else if word_start {
            result.push(c.to_ascii_uppercase());
            word_start = false;
        } else {
            result.push(c.to_ascii_lowercase());
        }
    }
    result
}

/// Comparison key for a path segment: lowercase with separators and brackets collapsed to single spaces.
#[must_use]
pub fn segment_key(segment: &str) -> String {
    segment
        .to_lowercase()
        .replace(SEGMENT_SEPARATORS, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove a trailing year from a segment key, keeping the key as is if nothing would remain.
#[must_use]
pub fn strip_year_suffix(key: &str) -> &str {
    RE_TRAILING_YEAR
        .captures(key)
        .and_then(|captures| captures.name("name"))
        .map_or(key, |name| name.as_str())
}

/// Check if two path segments name the same item.
///
/// Comparison ignores case and separators, and a trailing year on either side,
/// so `Foo (2021)`, `Foo.2021` and `foo` are all similar.
/// Two different years on both sides are not similar.
#[must_use]
pub fn is_similar(a: &str, b: &str) -> bool {
    let key_a = segment_key(a);
    let key_b = segment_key(b);
    if key_a.is_empty() || key_b.is_empty() {
        return false;
    }
    key_a == key_b || strip_year_suffix(&key_a) == key_b || key_a == strip_year_suffix(&key_b)
}

/// Return the season number if the segment is a season folder like `Season 01`.
#[must_use]
pub fn season_folder_number(segment: &str) -> Option<u32> {
    RE_SEASON_FOLDER
        .captures(segment)
        .and_then(|captures| captures.name("season"))
        .and_then(|season| season.as_str().parse().ok())
}

/// Remove characters that cannot appear in a file or directory name.
#[must_use]
pub fn sanitize_segment(name: &str) -> String {
    let cleaned = name.replace(ILLEGAL_NAME_CHARS, "");
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches('.')
        .trim()
        .to_string()
}
