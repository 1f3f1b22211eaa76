//! Replay a manifest against the filesystem.
//!
//! Entries are applied one at a time in manifest order.
//! Existing files are never overwritten and a failed entry does not stop the run.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use colored::Colorize;

use crate::manifest::entry::{Manifest, RenameEntry};
use crate::{print_error, print_warning};

/// Result of applying a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The file was moved, or would be in a dry run.
    Moved,
    /// The source is gone and the destination exists, so the move was done earlier.
    AlreadyApplied,
    MissingSource,
    DestinationExists,
    CreateDirFailed(String),
    MoveFailed(String),
}

/// Counts of entry outcomes for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Applies manifest entries in order.
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifestApplier {
    dryrun: bool,
    verbose: bool,
}

impl ApplyOutcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Moved | Self::AlreadyApplied)
    }
}

impl ApplyReport {
    /// Total number of entries processed.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.moved + self.skipped + self.failed
    }

    fn record(&mut self, outcome: &ApplyOutcome) {
        match outcome {
            ApplyOutcome::Moved => self.moved += 1,
            ApplyOutcome::AlreadyApplied => self.skipped += 1,
            _ => self.failed += 1,
        }
    }
}

impl ManifestApplier {
    #[must_use]
    pub const fn new(dryrun: bool, verbose: bool) -> Self {
        Self { dryrun, verbose }
    }

    /// Apply every entry in order and return the outcome counts.
    ///
    /// Earlier moves are kept even if later entries fail.
    pub fn apply(&self, manifest: &Manifest) -> ApplyReport {
        let mut report = ApplyReport::default();
        let total = manifest.len();
        let max_chars = total.to_string().chars().count();

        for (index, entry) in manifest.entries().iter().enumerate() {
            let outcome = self.apply_entry(entry);
            self.print_outcome(entry, &outcome, index + 1, total, max_chars);
            report.record(&outcome);
        }

        report
    }

    /// Apply a single entry.
    #[must_use]
    pub fn apply_entry(&self, entry: &RenameEntry) -> ApplyOutcome {
        let source_exists = entry.source.exists();
        let destination_exists = entry.destination.exists();

        if !source_exists {
            return if destination_exists {
                ApplyOutcome::AlreadyApplied
            } else {
                ApplyOutcome::MissingSource
            };
        }
        if destination_exists {
            return ApplyOutcome::DestinationExists;
        }
        if self.dryrun {
            return ApplyOutcome::Moved;
        }

        if let Err(error) = ensure_parent_dir(&entry.destination) {
            return ApplyOutcome::CreateDirFailed(error.to_string());
        }
        match move_file(&entry.source, &entry.destination) {
            Ok(()) => ApplyOutcome::Moved,
            Err(error) => ApplyOutcome::MoveFailed(error.to_string()),
        }
    }

    fn print_outcome(&self, entry: &RenameEntry, outcome: &ApplyOutcome, number: usize, total: usize, width: usize) {
        let source = crate::path_to_string_relative(&entry.source);
        let destination = crate::path_to_string_relative(&entry.destination);
        match outcome {
            ApplyOutcome::Moved => {
                let label = if self.dryrun { "Dryrun" } else { "Rename" };
                println!("{}", format!("{label} {number:>width$} / {total}:").bold().magenta());
                crate::show_diff(&source, &destination);
            }
            ApplyOutcome::AlreadyApplied => {
                if self.verbose {
                    println!("{}", format!("Already moved: {destination}").dimmed());
                }
            }
            ApplyOutcome::MissingSource => print_error!("Source does not exist: {source}"),
            ApplyOutcome::DestinationExists => print_warning!("Destination already exists, skipping: {destination}"),
            ApplyOutcome::CreateDirFailed(error) => {
                print_error!("Failed to create directory for {destination}: {error}");
            }
            ApplyOutcome::MoveFailed(error) => print_error!("Failed to move {source}: {error}"),
        }
    }
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} moved, {} skipped, {} failed",
            self.moved, self.skipped, self.failed
        )
    }
}

/// Create the parent directories of `path`.
/// An existing directory is not an error, but a file in its place is.
fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) else {
        return Ok(());
    };
    match fs::create_dir_all(parent) {
        Err(error) if error.kind() == io::ErrorKind::AlreadyExists && parent.is_dir() => Ok(()),
        result => result,
    }
}

/// Rename, or copy and remove when the destination is on another filesystem.
fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    match fs::rename(source, destination) {
        Err(error) if error.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(source, destination)?;
            fs::remove_file(source)
        }
        result => result,
    }
}
