//! Server configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.

use crate::provider::OpenAiConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub env: Environment,
    pub bind_addr: String,
    /// Directory holding saved jobs and settings.
    pub data_dir: PathBuf,
    pub openai: OpenAiConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.  Unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = OpenAiConfig::default();

        let timeout_seconds = match lookup("OPENAI_TIMEOUT_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("OPENAI_TIMEOUT_SECONDS is not a number: {raw}"))?,
            None => defaults.timeout_seconds,
        };

        Ok(Self {
            env: Environment::parse(&lookup("BRICKIE_ENV").unwrap_or_else(|| "dev".to_string())),
            bind_addr: lookup("BRICKIE_BIND_ADDR").unwrap_or_else(|| "127.0.0.1:3000".to_string()),
            data_dir: PathBuf::from(lookup("BRICKIE_DATA_DIR").unwrap_or_else(|| "data".to_string())),
            openai: OpenAiConfig {
                api_key: lookup("OPENAI_API_KEY").filter(|key| !key.trim().is_empty()),
                model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
                base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
                timeout_seconds,
                max_tokens: defaults.max_tokens,
            },
        })
    }
}
