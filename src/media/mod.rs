//! Media identity parsing and path canonicalization.
//!
//! Identity is taken from the first source that recognizes the path:
//! the file name, then the enclosing folders, then an optional external fallback.
//! The identity then gives a canonical destination path.

mod associated;
mod canonical;
mod extensions;
mod folder;
mod identity;
mod inference;
mod parser;
mod title;

use std::path::Path;

pub use associated::{AssociatedFile, find_associated_files};
pub use canonical::{canonicalize, denest, find_media_root, relative_layout};
pub use extensions::{
    DEFAULT_ASSOCIATED_EXTENSIONS, FileClass, MediaExtensions, VIDEO_EXTENSIONS, is_video_extension, is_video_file,
};
pub use folder::parse_folder_context;
pub use identity::{Identity, MediaKind};
pub use inference::{
    API_KEY_ENV, DEFAULT_API_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, IdentityFallback, InferenceClient,
    InferenceConfig, validate_api_key,
};
pub use parser::{parse_filename, parse_movie_name};
pub use title::{is_similar, normalize_title, sanitize_segment, season_folder_number, segment_key, strip_year_suffix};

/// Uniform signature shared by the deterministic parsers.
pub type ParseFn = fn(&Path) -> Option<Identity>;

/// Deterministic parsers in the order they are tried.
pub const PARSERS: &[ParseFn] = &[parse_filename, parse_folder_context];

/// Identify a path with the deterministic parsers, then the fallback if given.
/// The first result wins.
#[must_use]
pub fn identify(path: &Path, fallback: Option<&dyn IdentityFallback>) -> Option<Identity> {
    PARSERS
        .iter()
        .find_map(|parse| parse(path))
        .or_else(|| fallback.and_then(|fallback| fallback.infer(path)))
}
