//! Build a rename manifest from a list of input files.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::manifest::entry::{Manifest, RenameEntry};
use crate::media::{self, IdentityFallback, MediaExtensions};
use crate::print_warning;

/// Turns input files into rename entries.
pub struct ManifestBuilder {
    extensions: MediaExtensions,
    fallback: Option<Box<dyn IdentityFallback>>,
    verbose: bool,
}

/// Manifest plus counts describing how the inputs were handled.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub manifest: Manifest,
    /// Input files that got an identity.
    pub identified: usize,
    /// Input files that were already at their canonical path.
    pub unchanged: usize,
    /// Input files without an identity, in input order.
    pub unidentified: Vec<PathBuf>,
}

impl ManifestBuilder {
    #[must_use]
    pub const fn new(extensions: MediaExtensions) -> Self {
        Self {
            extensions,
            fallback: None,
            verbose: false,
        }
    }

    /// Use an identity source after the deterministic parsers fail.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Box<dyn IdentityFallback>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Identify each input file and collect the moves needed to reach the canonical layout.
    ///
    /// Files without an identity get no entry.
    /// Each source appears at most once, and entries whose destination equals the source are left out.
    /// Associated files come right after their primary file.
    pub fn build<I>(&self, files: I) -> BuildReport
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut report = BuildReport::default();
        let mut planned = PlannedPaths::default();

        for path in files {
            if !media::is_video_file(&path) {
                if self.verbose {
                    print_warning!("Skipping non-video file: {}", path.display());
                }
                continue;
            }

            let Some(identity) = media::identify(&path, self.fallback.as_deref()) else {
                if self.verbose {
                    print_warning!("Could not identify: {}", path.display());
                }
                report.unidentified.push(path);
                continue;
            };

            report.identified += 1;
            let original_dir = path.parent().unwrap_or_else(|| Path::new(""));
            let destination = media::canonicalize(&identity, original_dir);
            if self.verbose {
                println!("{} {}", identity.to_string().cyan(), path.display());
            }

            if destination == path {
                report.unchanged += 1;
            }

            let primary = RenameEntry::new(path.clone(), destination.clone());
            if !self.add_entry(&mut report.manifest, &mut planned, primary, true) {
                continue;
            }
            for associated in media::find_associated_files(&path, &destination, &self.extensions) {
                let entry = RenameEntry::new(associated.source, associated.destination);
                self.add_entry(&mut report.manifest, &mut planned, entry, false);
            }
        }

        report
    }

    /// Add the entry unless it is a no-op, a repeat, or collides with a planned destination.
    /// Returns false only when the entry was rejected.
    fn add_entry(&self, manifest: &mut Manifest, planned: &mut PlannedPaths, entry: RenameEntry, primary: bool) -> bool {
        if entry.source == entry.destination || planned.sources.contains(&entry.source) {
            return true;
        }
        if !entry.is_representable() {
            print_warning!("Skipping path that cannot be written to the manifest: {}", entry.source.display());
            return false;
        }
        if planned.destinations.contains(&entry.destination) {
            print_warning!(
                "Skipping {}: destination already planned for another file: {}",
                entry.source.display(),
                entry.destination.display()
            );
            return false;
        }
        if self.verbose && !primary {
            println!("  + {}", crate::path_to_filename_string(&entry.source));
        }
        planned.sources.insert(entry.source.clone());
        planned.destinations.insert(entry.destination.clone());
        manifest.push(entry);
        true
    }
}

#[derive(Default)]
struct PlannedPaths {
    sources: HashSet<PathBuf>,
    destinations: HashSet<PathBuf>,
}

impl fmt::Debug for ManifestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManifestBuilder")
            .field("extensions", &self.extensions)
            .field("fallback", &self.fallback.is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}

#[cfg(test)]
mod builder_tests {
    use super::*;

    use std::fs::{self, File};

    use tempfile::tempdir;

    use crate::media::Identity;

    struct FixedFallback;

    impl IdentityFallback for FixedFallback {
        fn infer(&self, path: &Path) -> Option<Identity> {
            Identity::movie("Mystery Film", Some(1999), "mkv", path)
        }
    }

    fn builder() -> ManifestBuilder {
        ManifestBuilder::new(MediaExtensions::default())
    }

    #[test]
    fn tv_episode_gets_season_layout() {
        let report = builder().build(vec![PathBuf::from(
            "/media/TV/Breaking Bad/Breaking.Bad.S03E12.Half.Measures.720p.mkv",
        )]);
        assert_eq!(report.identified, 1);
        assert_eq!(
            report.manifest.entries(),
            &[RenameEntry::new(
                PathBuf::from("/media/TV/Breaking Bad/Breaking.Bad.S03E12.Half.Measures.720p.mkv"),
                PathBuf::from("/media/TV/Breaking Bad/Season 03/Breaking Bad - S03E12 - Half Measures.mkv"),
            )]
        );
    }

    #[test]
    fn unidentified_files_are_reported() {
        let report = builder().build(vec![PathBuf::from("/downloads/clip.mkv")]);
        assert!(report.manifest.is_empty());
        assert_eq!(report.identified, 0);
        assert_eq!(report.unidentified, vec![PathBuf::from("/downloads/clip.mkv")]);
    }

    #[test]
    fn fallback_identifies_remaining_files() {
        let report = builder()
            .with_fallback(Box::new(FixedFallback))
            .build(vec![PathBuf::from("/downloads/clip.mkv")]);
        assert_eq!(
            report.manifest.entries(),
            &[RenameEntry::new(
                PathBuf::from("/downloads/clip.mkv"),
                PathBuf::from("/downloads/Mystery Film (1999)/Mystery Film (1999).mkv"),
            )]
        );
    }

    #[test]
    fn canonical_files_produce_no_entries() {
        let path = PathBuf::from("/media/TV/Breaking Bad/Season 03/Breaking Bad - S03E12 - Half Measures.mkv");
        let report = builder().build(vec![path]);
        assert_eq!(report.identified, 1);
        assert_eq!(report.unchanged, 1);
        assert!(report.manifest.is_empty());
    }

    #[test]
    fn duplicate_inputs_are_planned_once() {
        let path = PathBuf::from("/media/Movies/Heat.1995.1080p.mkv");
        let report = builder().build(vec![path.clone(), path]);
        assert_eq!(report.manifest.len(), 1);
    }

    #[test]
    fn conflicting_destinations_keep_first() {
        let report = builder().build(vec![
            PathBuf::from("/media/Movies/Heat.1995.1080p.mkv"),
            PathBuf::from("/media/Movies/Heat (1995).mkv"),
        ]);
        assert_eq!(report.identified, 2);
        assert_eq!(report.manifest.len(), 1);
        assert_eq!(
            report.manifest.entries()[0].source,
            PathBuf::from("/media/Movies/Heat.1995.1080p.mkv")
        );
    }

    #[test]
    fn non_video_inputs_are_ignored() {
        let report = builder().build(vec![PathBuf::from("/media/TV/Show.S01E01.srt")]);
        assert!(report.manifest.is_empty());
        assert!(report.unidentified.is_empty());
    }

    #[test]
    fn associated_files_follow_primary() {
        let dir = tempdir().expect("temp dir");
        let primary = dir.path().join("Show.S01E01.mkv");
        File::create(&primary).expect("create video");
        File::create(dir.path().join("Show.S01E01.en.srt")).expect("create subtitle");
        fs::write(dir.path().join("Show.S01E01.nfo"), "info").expect("create nfo");

        let report = builder().build(vec![primary.clone()]);
        let season = dir.path().join("Show/Season 01");
        assert_eq!(
            report.manifest.entries(),
            &[
                RenameEntry::new(primary, season.join("Show - S01E01.mkv")),
                RenameEntry::new(dir.path().join("Show.S01E01.en.srt"), season.join("Show - S01E01.en.srt")),
                RenameEntry::new(dir.path().join("Show.S01E01.nfo"), season.join("Show - S01E01.nfo")),
            ]
        );
    }
}
