//! Canonical destination paths.
//!
//! The destination is built from three parts:
//! the layout for the identity, the media root found in the original directory,
//! and a final pass that collapses directories repeating the same title.
//! Running it again on an already canonical path gives the same path.

use std::path::{Component, Path, PathBuf};

use crate::media::identity::{Identity, MediaKind};
use crate::media::title::{is_similar, sanitize_segment, season_folder_number};

/// Placeholder used when a title has no characters left after sanitizing.
const UNTITLED: &str = "Untitled";

/// Compute the canonical destination path for an identity found under `original_dir`.
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use media_rename::media::{Identity, canonicalize};
///
/// let source = Path::new("/media/TV/Breaking.Bad.S01E01.Pilot.1080p.mkv");
/// let identity = Identity::tv("Breaking Bad", 1, 1, Some("Pilot".to_string()), "mkv", source).unwrap();
/// assert_eq!(
///     canonicalize(&identity, Path::new("/media/TV")),
///     PathBuf::from("/media/TV/Breaking Bad/Season 01/Breaking Bad - S01E01 - Pilot.mkv")
/// );
/// ```
#[must_use]
pub fn canonicalize(identity: &Identity, original_dir: &Path) -> PathBuf {
    let media_root = find_media_root(identity, original_dir);
    denest(&media_root.join(relative_layout(identity)))
}

/// Relative target layout from the identity alone.
///
/// - TV: `Title/Season NN/Title - SNNENN[ - Episode Title].ext`
/// - Movie: `Title (Year)/Title (Year).ext`, or `Title/Title.ext` without a year
#[must_use]
pub fn relative_layout(identity: &Identity) -> PathBuf {
    let title = display_title(&identity.title);
    match &identity.kind {
        MediaKind::Tv {
            season,
            episode,
            episode_title,
        } => {
            let mut file_stem = format!("{title} - S{season:02}E{episode:02}");
            if let Some(episode_title) = episode_title.as_deref().map(sanitize_segment)
                && !episode_title.is_empty()
            {
                file_stem = format!("{file_stem} - {episode_title}");
            }
            PathBuf::from(&title)
                .join(format!("Season {season:02}"))
                .join(with_extension(&file_stem, &identity.extension))
        }
        MediaKind::Movie { year } => {
            let name = movie_name(&title, *year);
            PathBuf::from(&name).join(with_extension(&name, &identity.extension))
        }
    }
}

/// Find the directory the title folder should live in.
///
/// Scans the segments of `original_dir` from the end for one that already represents the item.
/// The parent of the deepest match is the media root.
/// Without a match the original directory is the media root.
#[must_use]
pub fn find_media_root(identity: &Identity, original_dir: &Path) -> PathBuf {
    let components: Vec<Component> = original_dir.components().collect();
    let title = display_title(&identity.title);

    for index in (0..components.len()).rev() {
        let Component::Normal(name) = components[index] else {
            continue;
        };
        let name = crate::os_str_to_string(name);
        let root_end = match &identity.kind {
            MediaKind::Tv { .. } => {
                if season_folder_number(&name).is_some() {
                    match index.checked_sub(1).map(|parent| components[parent]) {
                        Some(Component::Normal(show)) if is_similar(&crate::os_str_to_string(show), &title) => {
                            Some(index - 1)
                        }
                        _ => None,
                    }
                } else if is_similar(&name, &title) {
                    Some(index)
                } else {
                    None
                }
            }
            MediaKind::Movie { year } => {
                (is_similar(&name, &movie_name(&title, *year)) || is_similar(&name, &title)).then_some(index)
            }
        };
        if let Some(end) = root_end {
            return components[..end].iter().collect();
        }
    }

    original_dir.to_path_buf()
}

/// Collapse consecutive directory segments that name the same item, keeping the later one.
///
/// `Show/Show/Season 01` becomes `Show/Season 01` and `Title/Title (Year)` becomes `Title (Year)`.
/// The final segment (the file name) is never collapsed.
#[must_use]
pub fn denest(path: &Path) -> PathBuf {
    let components: Vec<Component> = path.components().collect();
    let Some((leaf, directories)) = components.split_last() else {
        return PathBuf::new();
    };

    let mut kept: Vec<Component> = Vec::with_capacity(components.len());
    for component in directories {
        if let (Component::Normal(current), Some(Component::Normal(previous))) = (component, kept.last())
            && is_similar(&crate::os_str_to_string(previous), &crate::os_str_to_string(current))
        {
            kept.pop();
        }
        kept.push(*component);
    }
    kept.push(*leaf);
    kept.iter().collect()
}

fn display_title(title: &str) -> String {
    let sanitized = sanitize_segment(title);
    if sanitized.is_empty() {
        UNTITLED.to_string()
    } else {
        sanitized
    }
}

fn movie_name(title: &str, year: Option<i32>) -> String {
    year.map_or_else(|| title.to_string(), |year| format!("{title} ({year})"))
}

fn with_extension(stem: &str, extension: &str) -> String {
    if extension.is_empty() {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    }
}

#[cfg(test)]
mod layout_tests {
    use super::*;

    fn tv(title: &str, season: u32, episode: u32, episode_title: Option<&str>) -> Identity {
        Identity::tv(
            title,
            season,
            episode,
            episode_title.map(ToString::to_string),
            "mkv",
            Path::new("x.mkv"),
        )
        .expect("valid identity")
    }

    #[test]
    fn tv_layout_zero_pads() {
        assert_eq!(
            relative_layout(&tv("Show", 3, 12, None)),
            PathBuf::from("Show/Season 03/Show - S03E12.mkv")
        );
        assert_eq!(
            relative_layout(&tv("Show", 10, 2, Some("Name"))),
            PathBuf::from("Show/Season 10/Show - S10E02 - Name.mkv")
        );
    }

    #[test]
    fn three_digit_episode_is_not_truncated() {
        assert_eq!(
            relative_layout(&tv("Show", 1, 101, None)),
            PathBuf::from("Show/Season 01/Show - S01E101.mkv")
        );
    }

    #[test]
    fn movie_layout_with_and_without_year() {
        let with_year = Identity::movie("Heat", Some(1995), "mp4", Path::new("x")).expect("valid identity");
        assert_eq!(relative_layout(&with_year), PathBuf::from("Heat (1995)/Heat (1995).mp4"));

        let without_year = Identity::movie("Heat", None, "mp4", Path::new("x")).expect("valid identity");
        assert_eq!(relative_layout(&without_year), PathBuf::from("Heat/Heat.mp4"));
    }

    #[test]
    fn directory_identity_has_no_extension() {
        let identity = Identity::movie("Heat", Some(1995), "", Path::new("Heat (1995)")).expect("valid identity");
        assert_eq!(relative_layout(&identity), PathBuf::from("Heat (1995)/Heat (1995)"));
    }

    #[test]
    fn illegal_characters_are_removed() {
        assert_eq!(
            relative_layout(&tv("Law: Order", 1, 1, Some("What/Why?"))),
            PathBuf::from("Law Order/Season 01/Law Order - S01E01 - WhatWhy.mkv")
        );
        assert_eq!(
            relative_layout(&tv("???", 1, 1, None)),
            PathBuf::from("Untitled/Season 01/Untitled - S01E01.mkv")
        );
    }
}

#[cfg(test)]
mod media_root_tests {
    use super::*;

    fn show(title: &str, season: u32) -> Identity {
        Identity::tv(title, season, 1, None, "mkv", Path::new("x.mkv")).expect("valid identity")
    }

    #[test]
    fn no_match_keeps_original_directory() {
        assert_eq!(
            find_media_root(&show("Show", 1), Path::new("/media/TV")),
            PathBuf::from("/media/TV")
        );
    }

    #[test]
    fn season_folder_under_show_folder() {
        assert_eq!(
            find_media_root(&show("Breaking Bad", 1), Path::new("/media/TV/Breaking.Bad/Season 02")),
            PathBuf::from("/media/TV")
        );
    }

    #[test]
    fn bare_show_folder() {
        assert_eq!(
            find_media_root(&show("Breaking Bad", 1), Path::new("/media/TV/breaking bad (2008)/extras")),
            PathBuf::from("/media/TV")
        );
    }

    #[test]
    fn deepest_match_wins() {
        assert_eq!(
            find_media_root(&show("Foo", 1), Path::new("/media/Foo/Foo/Season 01")),
            PathBuf::from("/media/Foo")
        );
    }

    #[test]
    fn season_folder_under_unrelated_folder_is_ignored() {
        assert_eq!(
            find_media_root(&show("Foo", 1), Path::new("/media/Bar/Season 01")),
            PathBuf::from("/media/Bar/Season 01")
        );
    }

    #[test]
    fn movie_folder_with_or_without_year() {
        let movie = Identity::movie("The Matrix", Some(1999), "mkv", Path::new("x.mkv")).expect("valid identity");
        assert_eq!(
            find_media_root(&movie, Path::new("/media/Movies/The Matrix (1999)")),
            PathBuf::from("/media/Movies")
        );
        assert_eq!(
            find_media_root(&movie, Path::new("/media/Movies/the.matrix/subs")),
            PathBuf::from("/media/Movies")
        );
        // Similar to the bare title even though the year differs.
        assert_eq!(
            find_media_root(&movie, Path::new("/media/Movies/The Matrix (2021)")),
            PathBuf::from("/media/Movies")
        );
        assert_eq!(
            find_media_root(&movie, Path::new("/media/Movies/The Matrix Reloaded")),
            PathBuf::from("/media/Movies/The Matrix Reloaded")
        );
    }

    #[test]
    fn relative_directory() {
        assert_eq!(find_media_root(&show("Show", 1), Path::new("Show")), PathBuf::new());
        assert_eq!(find_media_root(&show("Show", 1), Path::new("")), PathBuf::new());
    }
}
