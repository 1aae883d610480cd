use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::LlmSettings;

const DEFAULT_API_VERSION: &str = "2024-02-15-preview";
const DEFAULT_DEPLOYMENT: &str = "gpt-4o-mini";
const DEFAULT_LOGO_PATH: &str = "logo.png";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 30;

/// Application configuration loaded from environment variables.
///
/// Credentials are never defaulted: without both `AZURE_OPENAI_ENDPOINT` and
/// `AZURE_OPENAI_API_KEY` the refinement backend stays disabled and every
/// bullet falls back to the first sentence of the raw text.
#[derive(Debug, Clone)]
pub struct Config {
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_api_version: String,
    pub azure_deployment: String,
    pub llm_timeout: Duration,
    /// `None` when `LOGO_PATH` is set to an empty string.
    pub logo_path: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let llm_timeout_secs = match optional_env("LLM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_LLM_TIMEOUT_SECS,
        };

        let logo_path = std::env::var("LOGO_PATH")
            .unwrap_or_else(|_| DEFAULT_LOGO_PATH.to_string());

        Ok(Config {
            azure_endpoint: optional_env("AZURE_OPENAI_ENDPOINT"),
            azure_api_key: optional_env("AZURE_OPENAI_API_KEY"),
            azure_api_version: optional_env("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            azure_deployment: optional_env("AZURE_OPENAI_DEPLOYMENT_NAME")
                .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
            llm_timeout: Duration::from_secs(llm_timeout_secs),
            logo_path: (!logo_path.trim().is_empty()).then(|| PathBuf::from(logo_path)),
            host: optional_env("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: optional_env("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Settings for the chat-completions client, or `None` when the endpoint or
    /// API key is missing.
    pub fn llm_settings(&self) -> Option<LlmSettings> {
        let endpoint = self.azure_endpoint.clone()?;
        let api_key = self.azure_api_key.clone()?;
        Some(LlmSettings {
            endpoint,
            api_key,
            api_version: self.azure_api_version.clone(),
            deployment: self.azure_deployment.clone(),
            timeout: self.llm_timeout,
        })
    }
}

/// Reads an environment variable, treating blank values as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
