//! Structured identity extracted from a file or folder name.

use std::fmt;
use std::path::{Path, PathBuf};

/// What kind of item an identity describes, with the fields only that kind carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaKind {
    Tv {
        season: u32,
        episode: u32,
        episode_title: Option<String>,
    },
    Movie {
        year: Option<i32>,
    },
}

/// Identity record for a single path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub kind: MediaKind,
    /// Normalized display title, never empty.
    pub title: String,
    /// Lowercase video extension without the dot, or empty for a directory-only identity.
    pub extension: String,
    /// The exact input path this record was derived from.
    pub original_path: PathBuf,
}

impl Identity {
    /// Create a TV identity.
    ///
    /// Returns `None` when the title is empty or season/episode is not a positive number,
    /// so an incomplete episode can never reach path generation.
    #[must_use]
    pub fn tv(
        title: impl Into<String>,
        season: u32,
        episode: u32,
        episode_title: Option<String>,
        extension: impl Into<String>,
        original_path: &Path,
    ) -> Option<Self> {
        let title = title.into();
        if title.trim().is_empty() || season == 0 || episode == 0 {
            return None;
        }
        let episode_title = episode_title.filter(|name| !name.trim().is_empty());
        Some(Self {
            kind: MediaKind::Tv {
                season,
                episode,
                episode_title,
            },
            title,
            extension: extension.into(),
            original_path: original_path.to_path_buf(),
        })
    }

    /// Create a movie identity. Returns `None` for an empty title.
    #[must_use]
    pub fn movie(
        title: impl Into<String>,
        year: Option<i32>,
        extension: impl Into<String>,
        original_path: &Path,
    ) -> Option<Self> {
        let title = title.into();
        if title.trim().is_empty() {
            return None;
        }
        Some(Self {
            kind: MediaKind::Movie { year },
            title,
            extension: extension.into(),
            original_path: original_path.to_path_buf(),
        })
    }

    #[must_use]
    pub const fn is_tv(&self) -> bool {
        matches!(self.kind, MediaKind::Tv { .. })
    }

    /// Year for movies, `None` for TV.
    #[must_use]
    pub const fn year(&self) -> Option<i32> {
        match self.kind {
            MediaKind::Movie { year } => year,
            MediaKind::Tv { .. } => None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            MediaKind::Tv {
                season,
                episode,
                episode_title,
            } => {
                write!(f, "TV: {} S{season:02}E{episode:02}", self.title)?;
                if let Some(name) = episode_title {
                    write!(f, " - {name}")?;
                }
                Ok(())
            }
            MediaKind::Movie { year: Some(year) } => write!(f, "Movie: {} ({year})", self.title),
            MediaKind::Movie { year: None } => write!(f, "Movie: {}", self.title),
        }
    }
}
