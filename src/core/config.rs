//! Environment-driven configuration
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Add NOTIFICATION_PERMISSION for headless reminder testing
//! - 1.1.0: Add AI_PROVIDER switch (gemini/openai)
//! - 1.0.0: Initial release

use anyhow::{anyhow, Result};
use std::env;

use super::models::NotificationPermission;

/// Which generative text service backs the AI assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    OpenAi,
}

impl AiProvider {
    /// Model used when AI_MODEL is not set
    pub fn default_model(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-2.5-flash",
            AiProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

impl std::str::FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(AiProvider::Gemini),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(anyhow!("Unknown AI_PROVIDER: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub log_level: String,
    pub ai_provider: AiProvider,
    pub ai_model: String,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub notification_permission: NotificationPermission,
    pub patient_id: Option<String>,
    pub role: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let ai_provider = match non_empty("AI_PROVIDER") {
            Some(value) => value.parse()?,
            None => AiProvider::Gemini,
        };

        let ai_model =
            non_empty("AI_MODEL").unwrap_or_else(|| ai_provider.default_model().to_string());

        let notification_permission = match non_empty("NOTIFICATION_PERMISSION") {
            Some(value) => value.parse()?,
            None => NotificationPermission::Granted,
        };

        Ok(Config {
            database_path: non_empty("MEDIMATE_DATABASE_PATH")
                .unwrap_or_else(|| "medimate.db".to_string()),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            ai_provider,
            ai_model,
            gemini_api_key: non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            notification_permission,
            patient_id: non_empty("MEDIMATE_PATIENT_ID"),
            role: non_empty("MEDIMATE_ROLE"),
        })
    }
}
