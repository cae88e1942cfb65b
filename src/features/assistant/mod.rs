//! # AI Assistant Feature
//!
//! Drug information lookup and vitals analysis through an external text
//! generation service. One request per action; failures become a fixed
//! fallback message.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 1.1.0: Provider switch (Gemini or OpenAI)
//! - 1.0.0: Initial release

pub mod service;
pub mod prompts;
pub mod providers;

pub use service::AiAssistant;
pub use prompts::{HealthReadings, SugarReadingType, ANALYSIS_DISCLAIMER, FALLBACK_RESPONSE};
pub use providers::{generator_from_config, GeminiClient, OpenAiClient, TextGenerator};
