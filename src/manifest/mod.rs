//! Rename manifest: build a reviewable list of moves, then apply it.

mod apply;
mod builder;
mod entry;

pub use apply::{ApplyOutcome, ApplyReport, ManifestApplier};
pub use builder::{BuildReport, ManifestBuilder};
pub use entry::{Manifest, ManifestWarning, ParsedManifest, RenameEntry};

/// Default manifest file name, written to the current directory.
pub const MANIFEST_FILE_NAME: &str = "rename-manifest.txt";
