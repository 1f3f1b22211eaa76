use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use ::media_rename::manifest::{Manifest, ManifestApplier, ManifestBuilder};
use ::media_rename::media::{InferenceClient, MediaExtensions};
use ::media_rename::{print_bold, print_warning, sources};

use crate::config::Config;
use crate::{Args, Command};

/// What to do in this run.
#[derive(Debug)]
enum Mode {
    Plan { path: Option<PathBuf>, list: Option<PathBuf> },
    Apply,
}

#[derive(Debug)]
pub struct MediaRename {
    config: Config,
    mode: Mode,
}

impl MediaRename {
    /// Create from command line arguments.
    ///
    /// # Errors
    /// Returns an error if no subcommand was given.
    pub fn new(args: Args) -> Result<Self> {
        let config = Config::from_args(&args);
        let mode = match args.command.context("Missing subcommand")? {
            Command::Plan { path, list, .. } => Mode::Plan { path, list },
            Command::Apply => Mode::Apply,
        };
        if config.debug {
            eprintln!("Config: {config:#?}");
            eprintln!("Mode: {mode:?}");
        }
        Ok(Self { config, mode })
    }

    /// Run the selected mode.
    ///
    /// # Errors
    /// Returns an error if the input or manifest cannot be read, or the manifest cannot be written.
    pub fn run(&self) -> Result<()> {
        match &self.mode {
            Mode::Plan { path, list } => self.plan(path.as_deref(), list.as_deref()),
            Mode::Apply => self.apply(),
        }
    }

    /// Identify input files and write the manifest.
    fn plan(&self, path: Option<&Path>, list: Option<&Path>) -> Result<()> {
        // A bad credential must stop the run before any file is looked at.
        let fallback = if self.config.infer {
            Some(
                InferenceClient::new(self.config.inference.clone(), self.config.verbose)
                    .context("Invalid inference configuration")?,
            )
        } else {
            None
        };

        let files = if let Some(list) = list {
            sources::read_list_file(list)?
        } else {
            let root = ::media_rename::resolve_input_path(path)?;
            sources::collect_video_files(&root)?
        };
        if files.is_empty() {
            println!("No video files found.");
            return Ok(());
        }
        let input_count = files.len();

        let mut builder = ManifestBuilder::new(MediaExtensions::new(&self.config.associated_extensions))
            .verbose(self.config.verbose);
        if let Some(client) = fallback {
            builder = builder.with_fallback(Box::new(client));
        }
        let report = builder.build(files);

        let total = report.manifest.len();
        let max_chars = total.to_string().chars().count();
        for (number, entry) in report.manifest.entries().iter().enumerate() {
            println!("{}", format!("Plan {:>max_chars$} / {total}:", number + 1).bold().magenta());
            ::media_rename::show_diff(
                &::media_rename::path_to_string_relative(&entry.source),
                &::media_rename::path_to_string_relative(&entry.destination),
            );
        }

        for path in &report.unidentified {
            print_warning!("Unidentified: {}", ::media_rename::path_to_string_relative(path));
        }

        print_bold!(
            "{} video files: {} identified, {} unidentified, {} already in place, {} planned moves",
            input_count,
            report.identified,
            report.unidentified.len(),
            report.unchanged,
            total
        );

        if report.manifest.is_empty() {
            println!("Nothing to rename.");
        } else if self.config.dryrun {
            println!("Dryrun: manifest not written.");
        } else {
            report.manifest.write_to(&self.config.manifest)?;
            println!("Manifest written to: {}", self.config.manifest.display());
        }
        Ok(())
    }

    /// Read the manifest and apply its moves.
    fn apply(&self) -> Result<()> {
        let parsed = Manifest::read_from(&self.config.manifest)?;
        for warning in &parsed.warnings {
            print_warning!("Manifest {warning}");
        }
        if parsed.manifest.is_empty() {
            println!("No entries in manifest: {}", self.config.manifest.display());
            return Ok(());
        }

        let report = ManifestApplier::new(self.config.dryrun, self.config.verbose).apply(&parsed.manifest);
        let summary = format!("{} entries: {report}", report.total());
        if report.failed > 0 {
            println!("{}", summary.yellow().bold());
        } else {
            print_bold!("{summary}");
        }
        Ok(())
    }
}
