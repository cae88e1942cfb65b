//! Wellness command handlers
//!
//! Handles: water, checkin
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Local, Timelike};
use std::sync::Arc;

use super::require_caretaker;
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::Feeling;
use crate::features::dashboard::{CheckInPrompt, HYDRATION_GOAL};

pub struct WellnessHandler;

#[async_trait]
impl CommandHandler for WellnessHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["water", "checkin"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "water" => self.handle_water(&ctx, invocation).await,
            "checkin" => self.handle_checkin(&ctx, invocation).await,
            other => Err(anyhow!("WellnessHandler cannot handle '{}'", other)),
        }
    }
}

impl WellnessHandler {
    /// `water [+N|-N]`, one glass by default
    async fn handle_water(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "log water").await?;
        let delta: i32 = match invocation.arg(0) {
            Some(raw) => raw
                .trim_start_matches('+')
                .parse()
                .map_err(|e| anyhow!("Invalid glass count '{}': {}", raw, e))?,
            None => 1,
        };

        let count = ctx.store.lock().await.adjust_hydration(delta).await?;
        let mut reply = format!("💧 {count}/{HYDRATION_GOAL} glasses today");
        if count >= HYDRATION_GOAL {
            reply.push_str(" - goal reached! 🎉");
        }
        Ok(reply)
    }

    /// `checkin <feeling> [note...]`; without arguments shows the prompt
    async fn handle_checkin(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "record check-ins").await?;
        let prompt = CheckInPrompt::for_hour(Local::now().hour());
        let Some(raw_feeling) = invocation.arg(0) else {
            let options: Vec<&str> = Feeling::ALL.iter().map(Feeling::label).collect();
            return Ok(format!(
                "🙂 {}\nUse 'checkin <feeling> [note]' with one of: {}",
                prompt.text(),
                options.join(", ")
            ));
        };

        let feeling: Feeling = raw_feeling.parse()?;
        let note = Some(invocation.rest_from(1));
        let entry = ctx
            .store
            .lock()
            .await
            .add_health_log(feeling, note, prompt.text())
            .await?;

        Ok(match entry.note {
            Some(note) => format!("📝 Logged: feeling {} ({note})", entry.feeling),
            None => format!("📝 Logged: feeling {}", entry.feeling),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::logged_in_context;
    use crate::core::UserRole;

    async fn run(ctx: &Arc<CommandContext>, line: &str) -> Result<String> {
        let invocation = CommandInvocation::parse(line).unwrap();
        WellnessHandler.handle(ctx.clone(), &invocation).await
    }

    #[tokio::test]
    async fn test_water_counts_and_clamps() {
        let ctx = logged_in_context(UserRole::Caretaker).await;
        assert_eq!(run(&ctx, "water").await.unwrap(), "💧 1/8 glasses today");
        assert_eq!(run(&ctx, "water +7").await.unwrap(), "💧 8/8 glasses today - goal reached! 🎉");
        assert_eq!(run(&ctx, "water -20").await.unwrap(), "💧 0/8 glasses today");
        assert!(run(&ctx, "water lots").await.is_err());
    }

    #[tokio::test]
    async fn test_checkin_records_feeling_and_note() {
        let ctx = logged_in_context(UserRole::Caretaker).await;
        let reply = run(&ctx, "checkin tired slept badly").await.unwrap();
        assert_eq!(reply, "📝 Logged: feeling Tired (slept badly)");

        let reply = run(&ctx, r#"checkin "In Pain""#).await.unwrap();
        assert_eq!(reply, "📝 Logged: feeling In Pain");

        let store = ctx.store.lock().await;
        assert_eq!(store.state().health_log.len(), 2);
    }

    #[tokio::test]
    async fn test_checkin_without_args_lists_feelings() {
        let ctx = logged_in_context(UserRole::Caretaker).await;
        let reply = run(&ctx, "checkin").await.unwrap();
        assert!(reply.contains("Good, Tired, In Pain, Energetic"));
        assert!(run(&ctx, "checkin grumpy").await.is_err());
    }

    #[tokio::test]
    async fn test_family_cannot_log_wellness() {
        let ctx = logged_in_context(UserRole::Family).await;
        let err = run(&ctx, "water +3").await.unwrap_err();
        assert!(err.to_string().starts_with("Only the caretaker can log water"));
        let err = run(&ctx, "checkin good").await.unwrap_err();
        assert!(err.to_string().starts_with("Only the caretaker can record check-ins"));

        let store = ctx.store.lock().await;
        assert!(store.state().hydration.is_empty());
        assert!(store.state().health_log.is_empty());
    }
}
