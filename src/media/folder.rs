//! Folder-context parser.
//!
//! Used when the file name alone does not identify the item.
//! Walks the enclosing directories from the immediate parent upwards,
//! looking first for a `Season N` folder under a show folder and then for a movie folder.

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;

use crate::media::identity::Identity;
use crate::media::parser::{RE_SEASON_EPISODE, parse_movie_name, split_video_extension};
use crate::media::title::season_folder_number;

/// Loose episode marker, e.g. `Episode 7`, `ep.12`, `E05`.
static RE_LOOSE_EPISODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z0-9])(?:episode|ep|e)[\s._-]*(?P<episode>\d{1,3})(?:[^0-9]|$)")
        .expect("Failed to compile loose episode regex")
});

/// Bare number token bounded by separators, e.g. `05 - Title`.
static RE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[\s._\-\[(])(?P<number>\d{1,3})(?:[\s._\-\])]|$)").expect("Failed to compile ordinal regex")
});

/// Parse an identity from the folders enclosing the given path.
///
/// A `Season N` folder makes its parent folder the show title, used as is.
/// When such a folder is found but the file name has no recoverable episode number,
/// the result is `None` without looking for a movie folder.
#[must_use]
pub fn parse_folder_context(path: &Path) -> Option<Identity> {
    let (name, extension) = split_video_extension(path)?;
    let ancestors = ancestor_names(path);

    for (index, segment) in ancestors.iter().enumerate() {
        let Some(folder_season) = season_folder_number(segment) else {
            continue;
        };
        let Some(show) = ancestors.get(index + 1) else {
            continue;
        };
        if season_folder_number(show).is_some() {
            continue;
        }
        let (season, episode) = episode_from_name(&name, folder_season)?;
        return Identity::tv(show.trim(), season, episode, None, extension, path);
    }

    ancestors
        .iter()
        .filter(|segment| season_folder_number(segment).is_none())
        .find_map(|segment| parse_movie_name(segment, &extension, path))
}

/// Find season and episode numbers in a file name.
///
/// A full `SxxEyy` code wins over the folder season.
/// Otherwise a loose episode marker or a bare number gives the episode for the folder season.
fn episode_from_name(name: &str, folder_season: u32) -> Option<(u32, u32)> {
    if let Some(captures) = RE_SEASON_EPISODE.captures(name) {
        let season = captures.name("season")?.as_str().parse().ok()?;
        let episode = captures.name("episode")?.as_str().parse().ok()?;
        return Some((season, episode));
    }
    RE_LOOSE_EPISODE
        .captures(name)
        .and_then(|captures| captures.name("episode"))
        .or_else(|| RE_ORDINAL.captures(name).and_then(|captures| captures.name("number")))
        .and_then(|episode| episode.as_str().parse().ok())
        .map(|episode| (folder_season, episode))
}

/// Directory names enclosing the path, immediate parent first.
fn ancestor_names(path: &Path) -> Vec<String> {
    path.parent()
        .map(|parent| {
            parent
                .components()
                .rev()
                .filter_map(|component| match component {
                    Component::Normal(name) => Some(crate::os_str_to_string(name)),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}
