//! Files that travel with a primary video file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::media::extensions::{FileClass, MediaExtensions};

/// An associated file and where it should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociatedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Find files next to `primary` that belong to it and compute their new paths.
///
/// A sibling belongs to the primary file when its extension is an associated type
/// and its name starts with the primary file stem, followed by `.` or `-` or nothing,
/// compared case-insensitively. For example, `Show.S01E01.en.srt` and `Show.S01E01-poster.jpg`
/// belong to `Show.S01E01.mkv`.
///
/// The matched prefix is replaced with the new file stem and the file goes into the new directory.
/// A name that does not start with the exact stem keeps its own name.
/// An unreadable directory gives no associated files.
#[must_use]
pub fn find_associated_files(primary: &Path, new_primary: &Path, extensions: &MediaExtensions) -> Vec<AssociatedFile> {
    let Some(directory) = primary.parent() else {
        return Vec::new();
    };
    let directory = if directory.as_os_str().is_empty() {
        Path::new(".")
    } else {
        directory
    };
    let Ok(entries) = fs::read_dir(directory) else {
        return Vec::new();
    };

    let old_stem = crate::path_to_file_stem_string(primary);
    let new_stem = crate::path_to_file_stem_string(new_primary);
    let new_directory = new_primary.parent().unwrap_or_else(|| Path::new(""));
    if old_stem.is_empty() {
        return Vec::new();
    }

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_file()))
        .map(|entry| entry.path())
        .filter(|path| extensions.classify(path) == FileClass::Associated)
        .filter(|path| belongs_to(&crate::path_to_filename_string(path), &old_stem))
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .map(|source| {
            let file_name = crate::path_to_filename_string(&source);
            let new_name = file_name
                .strip_prefix(&old_stem)
                .map_or_else(|| file_name.clone(), |rest| format!("{new_stem}{rest}"));
            let destination = new_directory.join(new_name);
            AssociatedFile { source, destination }
        })
        .collect()
}

/// Check if the file name is the stem followed by `.` or `-`, ignoring ASCII case.
fn belongs_to(file_name: &str, stem: &str) -> bool {
    if file_name.len() <= stem.len() || !file_name.is_char_boundary(stem.len()) {
        return false;
    }
    let (prefix, rest) = file_name.split_at(stem.len());
    prefix.eq_ignore_ascii_case(stem) && (rest.starts_with('.') || rest.starts_with('-'))
}
