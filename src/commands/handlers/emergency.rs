//! Emergency command handlers
//!
//! Handles: emergency, call
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::features::emergency::{dispatch, emergency_dial_uri, EmergencyAlert, EmergencyReason};

pub struct EmergencyHandler;

#[async_trait]
impl CommandHandler for EmergencyHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["emergency", "call"]
    }

    async fn handle(
        &self,
        _ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "emergency" => self.handle_emergency(invocation),
            "call" => Ok(format!("📞 Call emergency services now: {}", emergency_dial_uri())),
            other => Err(anyhow!("EmergencyHandler cannot handle '{}'", other)),
        }
    }
}

impl EmergencyHandler {
    /// `emergency <reason> [--audio] [--photo] [details...]`; lists reasons without arguments
    fn handle_emergency(&self, invocation: &CommandInvocation) -> Result<String> {
        let positional = invocation.positional();
        let Some(raw_reason) = positional.first() else {
            let mut lines = vec!["🚨 What is the emergency?".to_string()];
            for (i, reason) in EmergencyReason::ALL.iter().enumerate() {
                lines.push(format!("  {:>2}. {reason}", i + 1));
            }
            lines.push("Use 'emergency <number|reason> [--audio] [--photo] [details]'".to_string());
            lines.push(format!("or 'call' to dial {}", emergency_dial_uri()));
            return Ok(lines.join("\n"));
        };

        let reason: EmergencyReason = raw_reason.parse()?;
        let mut alert = EmergencyAlert::compose(reason).with_details(&positional[1..].join(" "));
        if invocation.has_flag("--audio") {
            alert = alert.with_audio();
        }
        if invocation.has_flag("--photo") {
            alert = alert.with_photo();
        }

        let receipt = dispatch(&alert)?;
        Ok(format!(
            "🚨 Alert sent: {}\n   ref {} at {}\n   For immediate help use 'call' ({})",
            alert.message.trim_end(),
            receipt.alert_id,
            receipt.sent_at.format("%H:%M:%S UTC"),
            emergency_dial_uri()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::test_context;

    async fn run(line: &str) -> Result<String> {
        let invocation = CommandInvocation::parse(line).unwrap();
        EmergencyHandler.handle(test_context().await, &invocation).await
    }

    #[tokio::test]
    async fn test_lists_reasons() {
        let reply = run("emergency").await.unwrap();
        assert!(reply.contains(" 1. Panic attack"));
        assert!(reply.contains("14. Injury"));
    }

    #[tokio::test]
    async fn test_sends_alert() {
        let reply = run("emergency fall --photo slipped in the bathroom").await.unwrap();
        assert!(reply.contains("Alert sent: Fall. slipped in the bathroom"));
        assert!(run("emergency 99").await.is_err());
    }

    #[tokio::test]
    async fn test_call() {
        assert!(run("call").await.unwrap().contains("tel:112"));
    }
}
