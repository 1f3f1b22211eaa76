use std::sync::LazyLock;

use chrono::Datelike;

// Static variables that are initialised at runtime the first time they are accessed.

pub static CURRENT_YEAR: LazyLock<i32> = LazyLock::new(|| chrono::Utc::now().year());

/// Earliest year accepted for a bare year token.
pub const MIN_RELEASE_YEAR: i32 = 1900;

/// How many years past the current one a bare year token may point to.
pub const MAX_YEARS_AHEAD: i32 = 3;

/// Latest year accepted for a bare year token.
#[must_use]
pub fn max_release_year() -> i32 {
    *CURRENT_YEAR + MAX_YEARS_AHEAD
}

/// Check that a bare (not parenthesized) year token looks like a release year.
///
/// Parenthesized years are trusted as written and never go through this check.
#[must_use]
pub fn is_plausible_release_year(year: i32) -> bool {
    (MIN_RELEASE_YEAR..=max_release_year()).contains(&year)
}
