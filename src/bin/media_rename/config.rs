use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use itertools::Itertools;
use serde::Deserialize;

use ::media_rename::manifest::MANIFEST_FILE_NAME;
use ::media_rename::media::{API_KEY_ENV, DEFAULT_API_URL, DEFAULT_MODEL, InferenceConfig};
use ::media_rename::print_error;

use crate::{Args, Command};

/// Final config combined from CLI arguments, environment, and user config file.
#[derive(Debug)]
pub struct Config {
    pub(crate) associated_extensions: Vec<String>,
    pub(crate) debug: bool,
    pub(crate) dryrun: bool,
    pub(crate) infer: bool,
    pub(crate) inference: InferenceConfig,
    pub(crate) manifest: PathBuf,
    pub(crate) verbose: bool,
}

/// Config from the user config file
#[derive(Debug, Default, Deserialize)]
struct MediaRenameConfig {
    #[serde(default)]
    associated_extensions: Vec<String>,
    #[serde(default)]
    debug: bool,
    #[serde(default)]
    dryrun: bool,
    #[serde(default)]
    infer: bool,
    #[serde(default)]
    manifest: Option<PathBuf>,
    #[serde(default)]
    api_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    api_key: Option<String>,
    #[serde(default)]
    verbose: bool,
}

/// Wrapper needed for parsing the user config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    media_rename: MediaRenameConfig,
}

impl MediaRenameConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    fn get_user_config() -> Self {
        let Some(path) = ::media_rename::config_path() else {
            return Self::default();
        };
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content).unwrap_or_else(|error| {
                print_error!("Failed to parse config file {}: {error:#}", path.display());
                Self::default()
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(error) => {
                print_error!("Error reading config file {}: {error}", path.display());
                Self::default()
            }
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.media_rename)
            .context("Failed to parse media_rename config TOML")
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    pub fn from_args(args: &Args) -> Self {
        Self::merge(args, MediaRenameConfig::get_user_config(), env::var(API_KEY_ENV).ok())
    }

    /// Combine the sources. CLI values win, then the environment, then the config file.
    fn merge(args: &Args, user_config: MediaRenameConfig, env_api_key: Option<String>) -> Self {
        let (cli_associated, cli_infer, cli_api_key) = match &args.command {
            Some(Command::Plan {
                associated,
                infer,
                api_key,
                ..
            }) => (associated.clone(), *infer, api_key.clone()),
            _ => (Vec::new(), false, None),
        };

        let associated_extensions: Vec<String> = user_config
            .associated_extensions
            .into_iter()
            .chain(cli_associated)
            .map(|extension| extension.trim().trim_start_matches('.').to_lowercase())
            .filter(|extension| !extension.is_empty())
            .unique()
            .collect();

        let api_key = cli_api_key
            .or(env_api_key)
            .or(user_config.api_key)
            .map(|key| key.trim().to_string())
            .unwrap_or_default();

        let inference = InferenceConfig {
            api_url: user_config.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            model: user_config.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            ..InferenceConfig::default()
        };

        Self {
            associated_extensions,
            debug: args.debug || user_config.debug,
            dryrun: args.print || user_config.dryrun,
            infer: cli_infer || user_config.infer,
            inference,
            manifest: args
                .manifest
                .clone()
                .or(user_config.manifest)
                .unwrap_or_else(|| PathBuf::from(MANIFEST_FILE_NAME)),
            verbose: args.verbose || user_config.verbose,
        }
    }
}
