//! Text generation backends
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: OpenAI chat completion as an alternative provider
//! - 1.0.0: Gemini generateContent over HTTPS

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, error, info};
use openai::chat::{ChatCompletion, ChatCompletionMessage, ChatCompletionMessageRole};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::core::{AiProvider, Config};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Single prompt in, plain text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        GeminiClient {
            http: reqwest::Client::new(),
            api_key,
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_BASE_URL}/models/{}:generateContent", self.model)
    }
}

/// Concatenate the text parts of the first candidate
fn extract_gemini_text(response: &Value) -> Result<String> {
    if let Some(error) = response.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown error");
        return Err(anyhow!("Gemini API error: {}", message));
    }

    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow!("Unexpected response format: no candidate content"))?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(anyhow!("Gemini returned an empty response"));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| anyhow!("GEMINI_API_KEY environment variable not set"))?;

        debug!("Calling Gemini model {} ({} char prompt)", self.model, prompt.len());
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let json: Value = response.json().await?;
        if !status.is_success() && json.get("error").is_none() {
            error!("Gemini request failed with status {status}");
            return Err(anyhow!("Gemini request failed with status {}", status));
        }

        let text = extract_gemini_text(&json)?;
        info!("Gemini response received, length: {} characters", text.len());
        Ok(text)
    }
}

/// Chat completion through the `openai` crate. The crate reads its key from
/// the environment, so the binary exports `OPENAI_KEY` before first use.
pub struct OpenAiClient {
    api_key: Option<String>,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        OpenAiClient {
            api_key,
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if self.api_key.is_none() {
            return Err(anyhow!("OPENAI_API_KEY environment variable not set"));
        }

        debug!("Calling OpenAI model {} ({} char prompt)", self.model, prompt.len());
        let completion = ChatCompletion::builder(
            &self.model,
            vec![ChatCompletionMessage {
                role: ChatCompletionMessageRole::User,
                content: Some(prompt.to_string()),
                name: None,
                function_call: None,
                tool_call_id: None,
                tool_calls: None,
            }],
        )
        .create()
        .await?;

        completion
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| anyhow!("OpenAI returned an empty response"))
    }
}

/// Build the generator selected by AI_PROVIDER
pub fn generator_from_config(config: &Config) -> Arc<dyn TextGenerator> {
    match config.ai_provider {
        AiProvider::Gemini => Arc::new(GeminiClient::new(
            config.gemini_api_key.clone(),
            config.ai_model.clone(),
        )),
        AiProvider::OpenAi => Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.ai_model.clone(),
        )),
    }
}
