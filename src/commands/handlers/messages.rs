//! Messaging command handlers
//!
//! Handles: messages, send, close-chat
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::require_session;
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::{Message, UserRole};

pub struct MessagesHandler;

#[async_trait]
impl CommandHandler for MessagesHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["messages", "send", "close-chat"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "messages" => self.handle_thread(&ctx).await,
            "send" => self.handle_send(&ctx, invocation).await,
            "close-chat" => {
                ctx.messaging.close_conversation();
                Ok("Chat closed.".to_string())
            }
            other => Err(anyhow!("MessagesHandler cannot handle '{}'", other)),
        }
    }
}

impl MessagesHandler {
    /// Show the thread; unread incoming messages are marked read shortly after
    async fn handle_thread(&self, ctx: &CommandContext) -> Result<String> {
        let (state, role) = require_session(ctx).await?;
        ctx.messaging.open_conversation().await?;

        let mut lines = vec![format!("💬 Chat with {}", role.counterpart())];
        if state.messages.is_empty() {
            lines.push("  (no messages yet)".to_string());
        }
        lines.extend(state.messages.iter().map(|m| render_message(m, role)));
        if ctx.messaging.is_counterpart_typing() {
            lines.push(format!("  {} is typing...", role.counterpart()));
        }
        Ok(lines.join("\n"))
    }

    async fn handle_send(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let text = invocation.rest_from(0);
        if text.trim().is_empty() {
            bail!("Missing message text");
        }
        let message = ctx.messaging.send(&text).await?;
        Ok(format!("📤 Sent at {}", message.timestamp))
    }
}

/// One line of the thread; own messages are indented and show a read tick
fn render_message(message: &Message, viewer: UserRole) -> String {
    if message.sender == viewer {
        format!(
            "      {} [{}]{}",
            message.text,
            message.timestamp,
            if message.read { " ✓✓" } else { " ✓" }
        )
    } else {
        format!(
            "  {}: {} [{}]{}",
            message.sender,
            message.text,
            message.timestamp,
            if message.read { "" } else { " •new" }
        )
    }
}
