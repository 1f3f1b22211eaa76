//! Input file gathering: recursive directory scan or a list file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::media::is_video_file;

/// Collect video files under `root` in sorted order.
///
/// Hidden files and directories below the root are skipped.
/// A root that is itself a video file gives just that file.
///
/// # Errors
/// Returns an error if a directory cannot be read.
pub fn collect_video_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_video_file(root) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !crate::is_hidden(entry))
    {
        let entry = entry.map_err(|error| {
            let failed = error.path().unwrap_or(root).display().to_string();
            anyhow::Error::new(error).context(format!("Failed to read directory: {failed}"))
        })?;
        if entry.file_type().is_file() && is_video_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Read input paths from a list file, one path per line.
///
/// Lines are trimmed, blank lines are skipped,
/// and backslashes are converted to forward slashes.
///
/// # Errors
/// Returns an error if the file cannot be read.
pub fn read_list_file(path: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read list file: {}", path.display()))?;
    Ok(parse_list(&content))
}

fn parse_list(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| PathBuf::from(line.replace('\\', "/")))
        .collect()
}

#[cfg(test)]
mod collect_tests {
    use super::*;

    use std::fs::File;

    use tempfile::tempdir;

    #[test]
    fn finds_nested_video_files_sorted() {
        let dir = tempdir().expect("temp dir");
        let season = dir.path().join("Show/Season 01");
        fs::create_dir_all(&season).expect("create dirs");
        File::create(season.join("Show.S01E02.mkv")).expect("create file");
        File::create(season.join("Show.S01E01.MP4")).expect("create file");
        File::create(season.join("Show.S01E01.srt")).expect("create file");
        File::create(dir.path().join("Movie.2001.avi")).expect("create file");

        let files = collect_video_files(dir.path()).expect("collect");
        assert_eq!(
            files,
            vec![
                dir.path().join("Movie.2001.avi"),
                season.join("Show.S01E01.MP4"),
                season.join("Show.S01E02.mkv"),
            ]
        );
    }

    #[test]
    fn skips_hidden_entries() {
        let dir = tempdir().expect("temp dir");
        let hidden = dir.path().join(".trash");
        fs::create_dir_all(&hidden).expect("create dirs");
        File::create(hidden.join("Movie.2001.mkv")).expect("create file");
        File::create(dir.path().join(".partial.mkv")).expect("create file");
        File::create(dir.path().join("Visible.2002.mkv")).expect("create file");

        let files = collect_video_files(dir.path()).expect("collect");
        assert_eq!(files, vec![dir.path().join("Visible.2002.mkv")]);
    }

    #[test]
    fn single_file_root() {
        let dir = tempdir().expect("temp dir");
        let video = dir.path().join("Movie.2001.mkv");
        let text = dir.path().join("notes.txt");
        File::create(&video).expect("create file");
        File::create(&text).expect("create file");

        assert_eq!(collect_video_files(&video).expect("collect"), vec![video]);
        assert!(collect_video_files(&text).expect("collect").is_empty());
    }

    #[test]
    fn missing_root_is_error() {
        let dir = tempdir().expect("temp dir");
        let missing = dir.path().join("missing");
        let error = collect_video_files(&missing).expect_err("missing root");
        assert!(error.to_string().contains(&missing.display().to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_is_named_in_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("temp dir");
        let locked = dir.path().join("Movies/Locked");
        fs::create_dir_all(&locked).expect("create dirs");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("lock dir");

        // Permissions do not apply to a privileged user.
        let readable = fs::read_dir(&locked).is_ok();
        let result = collect_video_files(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("unlock dir");
        if readable {
            return;
        }

        let message = result.expect_err("unreadable directory").to_string();
        assert!(message.contains(&locked.display().to_string()), "unexpected error: {message}");
    }
}

#[cfg(test)]
mod list_file_tests {
    use super::*;

    use tempfile::tempdir;

    #[test]
    fn parses_lines() {
        let paths = parse_list("  /media/a.mkv \n\n\t\nD:\\TV\\Show\\b.mkv\r\n");
        assert_eq!(
            paths,
            vec![PathBuf::from("/media/a.mkv"), PathBuf::from("D:/TV/Show/b.mkv")]
        );
    }

    #[test]
    fn reads_file() {
        let dir = tempdir().expect("temp dir");
        let list = dir.path().join("files.txt");
        fs::write(&list, "/media/one.mkv\n/media/two.mkv\n").expect("write list");

        let paths = read_list_file(&list).expect("read list");
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn missing_file_is_error() {
        assert!(read_list_file(Path::new("/nonexistent/files.txt")).is_err());
    }
}
