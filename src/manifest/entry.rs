//! Rename entries and the manifest text format.
//!
//! Each entry is two lines: `-` followed by the source path,
//! then `+` followed by the destination path. Blank lines are ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const SOURCE_PREFIX: char = '-';
const DESTINATION_PREFIX: char = '+';

/// A single proposed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Ordered list of rename entries. The order is also the order moves are applied in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    entries: Vec<RenameEntry>,
}

/// Structural problem found while reading a manifest. The affected entry is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestWarning {
    /// A source line that is not immediately followed by a destination line.
    MissingDestination { line: usize, source: PathBuf },
    /// A destination line without a source line right before it.
    UnexpectedDestination { line: usize, destination: PathBuf },
    /// A line that does not start with `-` or `+`, or has an empty path.
    UnrecognizedLine { line: usize, content: String },
}

/// Result of reading a manifest: the valid entries and any structural warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedManifest {
    pub manifest: Manifest,
    pub warnings: Vec<ManifestWarning>,
}

impl RenameEntry {
    #[must_use]
    pub const fn new(source: PathBuf, destination: PathBuf) -> Self {
        Self { source, destination }
    }

    /// Check that both paths fit on a single manifest line.
    #[must_use]
    pub fn is_representable(&self) -> bool {
        let single_line = |path: &Path| {
            let text = crate::path_to_string(path);
            !text.is_empty() && !text.contains(['\n', '\r'])
        };
        single_line(&self.source) && single_line(&self.destination)
    }
}

impl Manifest {
    pub fn push(&mut self, entry: RenameEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[RenameEntry] {
        &self.entries
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize to the two-lines-per-entry text format.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        for entry in &self.entries {
            text.push(SOURCE_PREFIX);
            text.push_str(&crate::path_to_string(&entry.source));
            text.push('\n');
            text.push(DESTINATION_PREFIX);
            text.push_str(&crate::path_to_string(&entry.destination));
            text.push('\n');
        }
        text
    }

    /// Parse manifest text strictly pair by pair.
    ///
    /// Malformed pairs are reported as warnings and dropped; parsing always completes.
    #[must_use]
    pub fn parse(text: &str) -> ParsedManifest {
        let mut parsed = ParsedManifest::default();
        let mut pending: Option<(usize, PathBuf)> = None;

        for (index, line) in text.lines().enumerate() {
            let line_number = index + 1;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(source) = line.strip_prefix(SOURCE_PREFIX).filter(|path| !path.is_empty()) {
                if let Some((line, source)) = pending.take() {
                    parsed.warnings.push(ManifestWarning::MissingDestination { line, source });
                }
                pending = Some((line_number, PathBuf::from(source)));
            } else if let Some(destination) = line.strip_prefix(DESTINATION_PREFIX).filter(|path| !path.is_empty()) {
                let destination = PathBuf::from(destination);
                match pending.take() {
                    Some((_, source)) => parsed.manifest.push(RenameEntry::new(source, destination)),
                    None => parsed.warnings.push(ManifestWarning::UnexpectedDestination {
                        line: line_number,
                        destination,
                    }),
                }
            } else {
                if let Some((line, source)) = pending.take() {
                    parsed.warnings.push(ManifestWarning::MissingDestination { line, source });
                }
                parsed.warnings.push(ManifestWarning::UnrecognizedLine {
                    line: line_number,
                    content: line.to_string(),
                });
            }
        }

        if let Some((line, source)) = pending {
            parsed.warnings.push(ManifestWarning::MissingDestination { line, source });
        }
        parsed
    }

    /// Write the manifest to a file, replacing any existing content.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_text()).with_context(|| format!("Failed to write manifest: {}", path.display()))
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn read_from(path: &Path) -> Result<ParsedManifest> {
        let text =
            fs::read_to_string(path).with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Ok(Self::parse(&text))
    }
}

impl FromIterator<RenameEntry> for Manifest {
    fn from_iter<T: IntoIterator<Item = RenameEntry>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Manifest {
    type Item = &'a RenameEntry;
    type IntoIter = std::slice::Iter<'a, RenameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl fmt::Display for ManifestWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDestination { line, source } => {
                write!(f, "line {line}: source without destination: {}", source.display())
            }
            Self::UnexpectedDestination { line, destination } => {
                write!(f, "line {line}: destination without source: {}", destination.display())
            }
            Self::UnrecognizedLine { line, content } => write!(f, "line {line}: unrecognized line: {content}"),
        }
    }
}

#[cfg(test)]
mod manifest_text_tests {
    use super::*;

    fn entry(source: &str, destination: &str) -> RenameEntry {
        RenameEntry::new(PathBuf::from(source), PathBuf::from(destination))
    }

    #[test]
    fn serializes_alternating_lines() {
        let manifest: Manifest = vec![entry("/a/x.mkv", "/a/X/x.mkv"), entry("/a/x.srt", "/a/X/x.srt")]
            .into_iter()
            .collect();
        assert_eq!(manifest.to_text(), "-/a/x.mkv\n+/a/X/x.mkv\n-/a/x.srt\n+/a/X/x.srt\n");
    }

    #[test]
    fn parses_pairs_in_order_and_ignores_blank_lines() {
        let parsed = Manifest::parse("-/a/1.mkv\n+/b/1.mkv\n\n-/a/2.mkv\r\n+/b/2.mkv\r\n");
        assert!(parsed.warnings.is_empty());
        assert_eq!(
            parsed.manifest.entries(),
            &[entry("/a/1.mkv", "/b/1.mkv"), entry("/a/2.mkv", "/b/2.mkv")]
        );
    }

    #[test]
    fn paths_keep_spaces_and_dashes() {
        let parsed = Manifest::parse("-/a/Show - S01E01 .mkv\n+/b/Show - S01E01.mkv\n");
        assert_eq!(
            parsed.manifest.entries(),
            &[entry("/a/Show - S01E01 .mkv", "/b/Show - S01E01.mkv")]
        );
    }

    #[test]
    fn destination_without_source_is_dropped() {
        let parsed = Manifest::parse("+/dest.mkv\n-/a.mkv\n+/b.mkv\n");
        assert_eq!(parsed.manifest.entries(), &[entry("/a.mkv", "/b.mkv")]);
        assert_eq!(
            parsed.warnings,
            vec![ManifestWarning::UnexpectedDestination {
                line: 1,
                destination: PathBuf::from("/dest.mkv")
            }]
        );
    }

    #[test]
    fn source_without_destination_is_dropped() {
        let parsed = Manifest::parse("-/orphan.mkv\n-/a.mkv\n+/b.mkv\n-/last.mkv\n");
        assert_eq!(parsed.manifest.entries(), &[entry("/a.mkv", "/b.mkv")]);
        assert_eq!(
            parsed.warnings,
            vec![
                ManifestWarning::MissingDestination {
                    line: 1,
                    source: PathBuf::from("/orphan.mkv")
                },
                ManifestWarning::MissingDestination {
                    line: 4,
                    source: PathBuf::from("/last.mkv")
                },
            ]
        );
    }

    #[test]
    fn unrecognized_line_breaks_pair() {
        let parsed = Manifest::parse("-/a.mkv\n# comment\n+/b.mkv\n");
        assert!(parsed.manifest.is_empty());
        assert_eq!(parsed.warnings.len(), 3);
        assert!(matches!(parsed.warnings[0], ManifestWarning::MissingDestination { line: 1, .. }));
        assert!(matches!(parsed.warnings[1], ManifestWarning::UnrecognizedLine { line: 2, .. }));
        assert!(matches!(parsed.warnings[2], ManifestWarning::UnexpectedDestination { line: 3, .. }));
    }

    #[test]
    fn empty_paths_are_unrecognized() {
        let parsed = Manifest::parse("-\n+\n");
        assert!(parsed.manifest.is_empty());
        assert_eq!(parsed.warnings.len(), 2);
    }

    #[test]
    fn text_round_trip_preserves_order() {
        let manifest: Manifest = (1..=3)
            .map(|i| entry(&format!("/in/{i}.mkv"), &format!("/out/{i}.mkv")))
            .collect();
        let parsed = Manifest::parse(&manifest.to_text());
        assert!(parsed.warnings.is_empty());
        assert_eq!(parsed.manifest, manifest);
    }

    #[test]
    fn representable_entries() {
        assert!(entry("/a.mkv", "/b.mkv").is_representable());
        assert!(!entry("/a\n.mkv", "/b.mkv").is_representable());
        assert!(!entry("", "/b.mkv").is_representable());
    }

    #[test]
    fn warning_display() {
        let warning = ManifestWarning::UnexpectedDestination {
            line: 3,
            destination: PathBuf::from("/x.mkv"),
        };
        assert_eq!(warning.to_string(), "line 3: destination without source: /x.mkv");
    }
}
