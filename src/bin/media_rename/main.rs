mod config;
mod media_rename;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::media_rename::MediaRename;

#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Rename TV episodes and movies into a canonical library layout"
)]
pub(crate) struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Manifest file to write or read
    #[arg(short = 'm', long, global = true, value_hint = clap::ValueHint::FilePath)]
    manifest: Option<PathBuf>,

    /// Print debug information
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Only print changes without writing the manifest or moving files
    #[arg(short = 'p', long, global = true)]
    print: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Identify media files and write a rename manifest
    Plan {
        /// Optional input directory or file
        #[arg(value_hint = clap::ValueHint::AnyPath)]
        path: Option<PathBuf>,

        /// Read input files from a list file with one path per line
        #[arg(short = 'f', long, value_hint = clap::ValueHint::FilePath, conflicts_with = "path")]
        list: Option<PathBuf>,

        /// Extra associated file extension
        #[arg(short = 'a', long = "associated", num_args = 1, action = clap::ArgAction::Append, value_name = "EXTENSION")]
        associated: Vec<String>,

        /// Ask the inference endpoint about files the parsers cannot identify
        #[arg(short = 'i', long)]
        infer: bool,

        /// API key for the inference endpoint
        #[arg(short = 'k', long = "api-key", value_name = "KEY")]
        api_key: Option<String>,
    },

    /// Apply the moves listed in a manifest
    Apply,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if let Some(ref shell) = args.completion {
        ::media_rename::generate_shell_completion(*shell, Args::command(), true, env!("CARGO_BIN_NAME"))
    } else if args.command.is_none() {
        Args::command().print_help()?;
        Ok(())
    } else {
        MediaRename::new(args)?.run()
    }
}
