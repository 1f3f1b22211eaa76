//! Static filename parser.
//!
//! Rules are tried in a fixed order and the first match wins:
//! TV episode code, movie with a parenthesized year, movie with a bare year.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::date::is_plausible_release_year;
use crate::media::extensions::is_video_extension;
use crate::media::identity::Identity;
use crate::media::title::normalize_title;

/// Release tags that end the useful part of a name.
/// Everything from the first tag onwards is discarded.
const RELEASE_TAGS: &str = r"2160p|1080p|720p|576p|480p|4k|uhd|hdr10|hdr|bluray|blu-ray|bdremux|bdrip|brrip|remux|web-?dl|web-?rip|hdtv|dvdrip|x\.?264|x\.?265|h\.?264|h\.?265|hevc|xvid|divx|proper|repack|extended|unrated|amzn";

static RE_TV: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?P<title>.+?)[\s._-]+S(?P<season>\d{1,2})E(?P<episode>\d{1,2})(?:-?E\d{1,2})*(?P<rest>(?:[\s._-].*)?)$",
    )
    .expect("Failed to compile TV episode regex")
});

/// Release tag bounded by separators or brackets.
static RE_RELEASE_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)(?:^|[\s._\-\[(])(?:{RELEASE_TAGS})(?:[\s._\-\])]|$)"))
        .expect("Failed to compile release tag regex")
});

static RE_MOVIE_PARENTHESIZED_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?)[\s._-]*\((?P<year>\d{4})\)").expect("Failed to compile parenthesized year regex")
});

/// Bare year token after a run of separators, so `Heat - 1995` leaves no dash in the title.
/// Matched repeatedly with `captures_at` so that adjacent candidates like `2049.2017` are all visited.
static RE_BARE_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s._\-\[(]+(?P<year>\d{4})(?:[\s._\-\])]|$)").expect("Failed to compile bare year regex")
});

/// Season and episode code anywhere in a name, e.g. `S02E05`.
pub(crate) static RE_SEASON_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])S(?P<season>\d{1,2})E(?P<episode>\d{1,3})(?:[^0-9]|$)")
        .expect("Failed to compile season episode regex")
});

/// Parse an identity from the file name of the given path.
///
/// The extension is stripped only when it is a video extension,
/// so folder names can be passed in place of files.
/// Returns `None` when no rule matches.
#[must_use]
pub fn parse_filename(path: &Path) -> Option<Identity> {
    let (name, extension) = split_video_extension(path)?;
    parse_tv(&name, &extension, path)
        .or_else(|| parse_movie_parenthesized_year(&name, &extension, path))
        .or_else(|| parse_movie_bare_year(&name, &extension, path))
}

/// Parse a movie identity from a name, trying the parenthesized and then the bare year rule.
#[must_use]
pub fn parse_movie_name(name: &str, extension: &str, path: &Path) -> Option<Identity> {
    parse_movie_parenthesized_year(name, extension, path).or_else(|| parse_movie_bare_year(name, extension, path))
}

/// Split the file name into a name and a lowercase video extension.
/// A non-video extension stays part of the name and the returned extension is empty.
pub(crate) fn split_video_extension(path: &Path) -> Option<(String, String)> {
    let (stem, extension) = crate::get_normalized_file_name_and_extension(path).ok()?;
    if is_video_extension(&extension) {
        Some((stem, extension.to_lowercase()))
    } else if extension.is_empty() {
        Some((stem, String::new()))
    } else {
        Some((format!("{stem}.{extension}"), String::new()))
    }
}

fn parse_tv(name: &str, extension: &str, path: &Path) -> Option<Identity> {
    let captures = RE_TV.captures(name)?;
    let title = normalize_title(captures.name("title")?.as_str());
    let season = captures.name("season")?.as_str().parse().ok()?;
    let episode = captures.name("episode")?.as_str().parse().ok()?;
    let episode_title = captures
        .name("rest")
        .map(|rest| normalize_title(strip_release_tags(rest.as_str())))
        .filter(|name| !name.is_empty());

    Identity::tv(title, season, episode, episode_title, extension, path)
}

/// Cut the text at the first release tag and trim separators from both ends.
fn strip_release_tags(text: &str) -> &str {
    let end = RE_RELEASE_TAG.find(text).map_or(text.len(), |m| m.start());
    text[..end].trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '_' | '-'))
}

fn parse_movie_parenthesized_year(name: &str, extension: &str, path: &Path) -> Option<Identity> {
    let captures = RE_MOVIE_PARENTHESIZED_YEAR.captures(name)?;
    let title = normalize_title(captures.name("title")?.as_str());
    let year = captures.name("year")?.as_str().parse().ok()?;
    Identity::movie(title, Some(year), extension, path)
}

fn parse_movie_bare_year(name: &str, extension: &str, path: &Path) -> Option<Identity> {
    let mut start = 0;
    while let Some(captures) = RE_BARE_YEAR.captures_at(name, start) {
        let whole = captures.get(0)?;
        let year_match = captures.name("year")?;
        start = year_match.end();

        let Ok(year) = year_match.as_str().parse::<i32>() else {
            continue;
        };
        if !is_plausible_release_year(year) {
            continue;
        }
        let title = normalize_title(&name[..whole.start()]);
        if title.is_empty() {
            continue;
        }
        return Identity::movie(title, Some(year), extension, path);
    }
    None
}


#[cfg(test)]
mod movie_parser_tests {
    use super::*;

    use crate::date::CURRENT_YEAR;

    fn movie(name: &str) -> Option<(String, Option<i32>)> {
        parse_filename(Path::new(name)).map(|identity| {
            assert!(!identity.is_tv(), "expected movie identity for {name}");
            (identity.title.clone(), identity.year())
        })
    }

    #[test]
    fn bare_year_with_tags() {
        assert_eq!(movie("The.Matrix.1999.BluRay.mkv"), Some(("The Matrix".to_string(), Some(1999))));
    }

    #[test]
    fn parenthesized_year() {
        assert_eq!(
            movie("The Matrix (1999) [1080p].mkv"),
            Some(("The Matrix".to_string(), Some(1999)))
        );
    }

    #[test]
    fn parenthesized_year_has_no_upper_bound() {
        let year = *CURRENT_YEAR + 50;
        assert_eq!(
            movie(&format!("Future Film ({year}).mkv")),
            Some(("Future Film".to_string(), Some(year)))
        );
    }

    #[test]
    fn bare_year_boundaries() {
        let max = *CURRENT_YEAR + 3;
        let too_late = *CURRENT_YEAR + 4;
        assert_eq!(movie("Film.1900.mkv"), Some(("Film".to_string(), Some(1900))));
        assert_eq!(movie(&format!("Film.{max}.mkv")), Some(("Film".to_string(), Some(max))));
        assert_eq!(movie("Film.1899.mkv"), None);
        assert_eq!(movie(&format!("Film.{too_late}.mkv")), None);
    }

    #[test]
    fn separator_run_before_bare_year() {
        assert_eq!(movie("Heat - 1995.mkv"), Some(("Heat".to_string(), Some(1995))));
        assert_eq!(movie("Heat_-_1995_1080p.mkv"), Some(("Heat".to_string(), Some(1995))));
        assert_eq!(movie("Heat -[1995].mkv"), Some(("Heat".to_string(), Some(1995))));
    }

    #[test]
    fn resolution_is_not_a_year() {
        assert_eq!(movie("Some.Film.1080.mkv"), None);
    }

    #[test]
    fn skips_implausible_year_in_title() {
        assert_eq!(
            movie("Blade.Runner.2049.2017.mkv"),
            Some(("Blade Runner 2049".to_string(), Some(2017)))
        );
    }

    #[test]
    fn year_only_name_is_not_a_title() {
        assert_eq!(movie("1999.mkv"), None);
        assert_eq!(movie("1917.2019.mkv"), Some(("1917".to_string(), Some(2019))));
    }

    #[test]
    fn folder_name_without_extension() {
        let identity = parse_filename(Path::new("/media/Movies/Heat (1995)")).expect("should parse");
        assert_eq!(identity.title, "Heat");
        assert_eq!(identity.year(), Some(1995));
        assert_eq!(identity.extension, "");
    }

    #[test]
    fn no_match() {
        assert!(parse_filename(Path::new("holiday video.mkv")).is_none());
        assert!(parse_filename(Path::new("")).is_none());
    }
}
