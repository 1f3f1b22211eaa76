//! Recognized file extensions.

use std::path::Path;

use itertools::Itertools;

/// Video extensions, lowercase without the leading dot.
pub const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov", "wmv", "flv", "m4v", "ts"];

/// Default extensions for files that travel with a video:
/// subtitles and captions, info files, thumbnails and plain text.
pub const DEFAULT_ASSOCIATED_EXTENSIONS: &[&str] = &[
    "srt", "sub", "idx", "ass", "ssa", "vtt", "sup", "smi", "nfo", "jpg", "jpeg", "png", "webp", "tbn", "txt",
];

/// How a file is treated based on its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Associated,
    Video,
    Other,
}

/// Extension sets used for classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaExtensions {
    associated: Vec<String>,
}

impl Default for MediaExtensions {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl MediaExtensions {
    /// Create extension sets with extra associated extensions on top of the defaults.
    #[must_use]
    pub fn new(extra_associated: &[String]) -> Self {
        let associated = DEFAULT_ASSOCIATED_EXTENSIONS
            .iter()
            .map(ToString::to_string)
            .chain(extra_associated.iter().map(|ext| normalize_extension(ext)))
            .filter(|ext| !ext.is_empty() && !is_video_extension(ext))
            .unique()
            .collect();
        Self { associated }
    }

    /// Classify an extension. The associated set is checked before the video set.
    #[must_use]
    pub fn classify_extension(&self, extension: &str) -> FileClass {
        let extension = normalize_extension(extension);
        if self.associated.iter().any(|ext| *ext == extension) {
            FileClass::Associated
        } else if is_video_extension(&extension) {
            FileClass::Video
        } else {
            FileClass::Other
        }
    }

    /// Classify a path by its extension.
    #[must_use]
    pub fn classify(&self, path: &Path) -> FileClass {
        self.classify_extension(&crate::path_to_file_extension_string(path))
    }

    #[must_use]
    pub fn associated(&self) -> &[String] {
        &self.associated
    }
}

/// Check if the extension (with or without a leading dot, any case) is a video extension.
#[must_use]
pub fn is_video_extension(extension: &str) -> bool {
    let extension = normalize_extension(extension);
    VIDEO_EXTENSIONS.contains(&extension.as_str())
}

/// Check if the path has a video extension.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    is_video_extension(&crate::path_to_file_extension_string(path))
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}
