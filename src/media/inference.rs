//! External inference fallback.
//!
//! Asks an OpenAI-compatible chat completions endpoint to classify a path
//! when neither the filename parser nor the folder-context parser could.
//! Every failure degrades to "no identity" for that file.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::media::identity::Identity;
use crate::media::parser::split_video_extension;
use crate::print_warning;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable that can hold the API key.
pub const API_KEY_ENV: &str = "MEDIA_RENAME_API_KEY";

const MIN_API_KEY_LENGTH: usize = 20;

const SYSTEM_PROMPT: &str = "You identify TV episodes and movies from file paths. \
Reply with a single JSON object and nothing else, using the keys: \
\"kind\" (\"tv\", \"movie\" or \"unknown\"), \"title\" (show or movie title), \
\"season\" and \"episode\" (integers, TV only), \"episode_title\" (TV only, optional), \
\"year\" (integer, movie only, optional).";

/// Last-resort identity source used after the deterministic parsers.
pub trait IdentityFallback {
    /// Return an identity for the path, or `None` if it could not be determined.
    fn infer(&self, path: &Path) -> Option<Identity>;
}

/// Connection settings for the inference endpoint.
#[derive(Clone)]
pub struct InferenceConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Inference client that blocks on each request.
#[derive(Debug)]
pub struct InferenceClient {
    client: Client,
    runtime: Runtime,
    config: InferenceConfig,
    verbose: bool,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum InferredKind {
    Tv,
    Movie,
    #[serde(other)]
    Unknown,
}

/// Partial identity as returned by the endpoint.
#[derive(Debug, Deserialize)]
struct InferredIdentity {
    kind: InferredKind,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    season: Option<u32>,
    #[serde(default)]
    episode: Option<u32>,
    #[serde(default)]
    episode_title: Option<String>,
    #[serde(default)]
    year: Option<i32>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: String::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl InferenceClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns an error if the API key is malformed or the HTTP client or runtime cannot be created.
    /// No request is made here.
    pub fn new(config: InferenceConfig, verbose: bool) -> Result<Self> {
        validate_api_key(&config.api_key)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("Failed to create async runtime")?;

        Ok(Self {
            client,
            runtime,
            config,
            verbose,
        })
    }

    async fn request_identity(&self, path: &Path) -> Result<Option<Identity>> {
        let path_string = crate::path_to_string(path);
        let body = ChatRequest {
            model: &self.config.model,
            temperature: 0.0,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &path_string,
                },
            ],
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send inference request")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("Inference request failed: HTTP {status} - {text}");
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("Failed to parse inference response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .context("Inference response has no content")?;

        parse_inference_content(&content, path)
    }
}

impl IdentityFallback for InferenceClient {
    fn infer(&self, path: &Path) -> Option<Identity> {
        match self.runtime.block_on(self.request_identity(path)) {
            Ok(identity) => {
                if self.verbose {
                    match &identity {
                        Some(identity) => println!("Inferred: {identity}"),
                        None => println!("Inference could not identify: {}", path.display()),
                    }
                }
                identity
            }
            Err(error) => {
                print_warning!("Inference failed for {}: {error:#}", path.display());
                None
            }
        }
    }
}

/// Reject obviously malformed API keys before any request is made.
///
/// # Errors
/// Returns an error describing why the key was rejected.
pub fn validate_api_key(api_key: &str) -> Result<()> {
    if api_key.is_empty() {
        bail!("API key is empty");
    }
    if api_key.chars().any(char::is_whitespace) {
        bail!("API key contains whitespace");
    }
    if !api_key.chars().all(|c| c.is_ascii_graphic()) {
        bail!("API key contains invalid characters");
    }
    if api_key.len() < MIN_API_KEY_LENGTH {
        bail!("API key is too short: expected at least {MIN_API_KEY_LENGTH} characters");
    }
    Ok(())
}

/// Decode the message content into an identity for the given path.
///
/// A TV result without both season and episode gives `None`, not a partial identity.
fn parse_inference_content(content: &str, path: &Path) -> Result<Option<Identity>> {
    let json = strip_code_fence(content);
    let inferred: InferredIdentity =
        serde_json::from_str(json).with_context(|| format!("Invalid inference JSON: {json}"))?;

    let extension = split_video_extension(path).map(|(_, extension)| extension).unwrap_or_default();
    let Some(title) = inferred.title.map(|title| title.trim().to_string()) else {
        return Ok(None);
    };

    let identity = match inferred.kind {
        InferredKind::Tv => match (inferred.season, inferred.episode) {
            (Some(season), Some(episode)) => {
                Identity::tv(title, season, episode, inferred.episode_title, extension, path)
            }
            _ => None,
        },
        InferredKind::Movie => Identity::movie(title, inferred.year, extension, path),
        InferredKind::Unknown => None,
    };
    Ok(identity)
}

/// Remove a surrounding Markdown code fence if present.
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[cfg(test)]
mod api_key_tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        assert!(validate_api_key("").is_err());
    }

    #[test]
    fn rejects_whitespace() {
        assert!(validate_api_key("sk-abcdefghij klmnopqrstuvwxyz").is_err());
        assert!(validate_api_key("sk-abcdefghijklmnopqrstuvwxyz\n").is_err());
    }

    #[test]
    fn rejects_short_key() {
        assert!(validate_api_key("sk-short").is_err());
    }

    #[test]
    fn rejects_non_ascii() {
        assert!(validate_api_key("sk-äbcdefghijklmnopqrstuvwxyz").is_err());
    }

    #[test]
    fn accepts_plausible_key() {
        assert!(validate_api_key("sk-abcdefghijklmnopqrstuvwxyz0123").is_ok());
    }

    #[test]
    fn client_creation_validates_key_first() {
        let config = InferenceConfig {
            api_key: "bad key".to_string(),
            ..Default::default()
        };
        assert!(InferenceClient::new(config, false).is_err());

        let config = InferenceConfig {
            api_key: "sk-abcdefghijklmnopqrstuvwxyz0123".to_string(),
            ..Default::default()
        };
        assert!(InferenceClient::new(config, false).is_ok());
    }

    #[test]
    fn debug_output_hides_key() {
        let config = InferenceConfig {
            api_key: "sk-abcdefghijklmnopqrstuvwxyz0123".to_string(),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-abc"));
        assert!(debug.contains("<redacted>"));
    }
}
