//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.dialogflow-middleware/config.json`) and
//! environment. Everything is read once when the middleware is constructed.

use crate::patterns::PatternSpec;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

/// Language used for NLU queries when the message carries none.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Middleware configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiddlewareConfig {
    /// Dialogflow (Google Cloud) project id. Required. Overridden by DIALOGFLOW_PROJECT_ID env.
    #[serde(default)]
    pub project_id: Option<String>,

    /// Intent/action matches below this detection confidence are rejected (default 0.5).
    #[serde(default = "default_minimum_confidence", alias = "minimum_confidence")]
    pub minimum_confidence: f64,

    /// Message fields concatenated into the NLU session id (default ["user", "channel"]).
    /// A single string is accepted as a one-element list.
    #[serde(
        default = "default_session_id_props",
        deserialize_with = "string_or_seq"
    )]
    pub session_id_props: Vec<String>,

    /// Message types to skip entirely: plain strings are literals, `{"regex": "..."}` are regexes.
    #[serde(default)]
    pub ignore_type: Vec<PatternSpec>,

    /// API base URL (default https://dialogflow.googleapis.com/v2). Overridden by DIALOGFLOW_ENDPOINT env.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// OAuth bearer token for the API. Overridden by DIALOGFLOW_ACCESS_TOKEN env.
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_minimum_confidence() -> f64 {
    0.5
}

fn default_session_id_props() -> Vec<String> {
    vec!["user".to_string(), "channel".to_string()]
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            minimum_confidence: default_minimum_confidence(),
            session_id_props: default_session_id_props(),
            ignore_type: Vec::new(),
            endpoint: None,
            access_token: None,
        }
    }
}

impl MiddlewareConfig {
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: Some(project_id.into()),
            ..Self::default()
        }
    }
}

fn string_or_seq<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the project id: env DIALOGFLOW_PROJECT_ID overrides config.
pub fn resolve_project_id(config: &MiddlewareConfig) -> Option<String> {
    env_non_empty("DIALOGFLOW_PROJECT_ID").or_else(|| trimmed(config.project_id.as_ref()))
}

/// Resolve the access token: env DIALOGFLOW_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &MiddlewareConfig) -> Option<String> {
    env_non_empty("DIALOGFLOW_ACCESS_TOKEN").or_else(|| trimmed(config.access_token.as_ref()))
}

/// Resolve the API endpoint: env DIALOGFLOW_ENDPOINT overrides config.
pub fn resolve_endpoint(config: &MiddlewareConfig) -> Option<String> {
    env_non_empty("DIALOGFLOW_ENDPOINT").or_else(|| trimmed(config.endpoint.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("DIALOGFLOW_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".dialogflow-middleware").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, the default path, or DIALOGFLOW_CONFIG_PATH.
/// Missing file => default config. Env overrides are applied to the result.
pub fn load_config(path: Option<PathBuf>) -> Result<(MiddlewareConfig, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let mut config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        MiddlewareConfig::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    config.project_id = resolve_project_id(&config);
    config.access_token = resolve_access_token(&config);
    config.endpoint = resolve_endpoint(&config);
    Ok((config, path))
}
