//! Utility command handlers
//!
//! Handles: help, version, features, status
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Console help text for the care companion commands
//! - 1.0.0: Extracted from command_handler.rs

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::features::{get_app_version, get_features};

const HELP: &str = "\
Session
  login <patient-id> [caretaker|family]   Open a patient profile
  signup <patient name> [--family]        Create a new Patient ID and log in
  logout | whoami
Today
  dashboard | home                         Next dose, appointments, hydration
  medicines                                All medicines with today's taken marks
  take <id>                                Mark or unmark a medicine as taken today
  add-med <name> <dosage> <HH:MM> <stock> <threshold>
  edit-med <id> field=value...             name, dosage, time, stock, threshold
  appointments | add-appt <doctor> <clinic> <date> <HH:MM>
  water [+N|-N]                            Log glasses of water
  checkin <feeling> [note]                 Good, Tired, In Pain, Energetic
Chat
  messages | send <text> | close-chat
AI assistant
  drug-info <medicine>                     Uses, side effects, interactions
  vitals <sys>/<dia> <sugar> [fasting|after-meal]
Profile
  settings | set <key> <value> | theme [light|dark] | export [dir]
Emergency
  emergency [reason] [--audio] [--photo] [details] | call
Other
  help | version | features | status | quit";

pub struct UtilityHandler;

#[async_trait]
impl CommandHandler for UtilityHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["help", "version", "features", "status"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "help" => Ok(HELP.to_string()),
            "version" | "features" => Ok(self.handle_version()),
            "status" => Ok(self.handle_status(&ctx).await),
            other => Err(anyhow!("UtilityHandler cannot handle '{}'", other)),
        }
    }
}

impl UtilityHandler {
    fn handle_version(&self) -> String {
        let mut output = format!("MediMate v{}\n\nFeature versions:\n", get_app_version());
        for feature in get_features() {
            output.push_str(&format!("• {} v{}\n", feature.name, feature.version));
        }
        output.trim_end().to_string()
    }

    async fn handle_status(&self, ctx: &CommandContext) -> String {
        let uptime = ctx.start_time.elapsed();
        let hours = uptime.as_secs() / 3600;
        let minutes = (uptime.as_secs() % 3600) / 60;
        let seconds = uptime.as_secs() % 60;

        let session = match ctx.store.lock().await.session() {
            Some(session) => format!("{} ({})", session.patient_id, session.role),
            None => "not logged in".to_string(),
        };

        format!(
            "⏱️ Uptime: {hours}h {minutes}m {seconds}s\n👤 Session: {session}\n🔔 Pending reminders: {}\n📦 Version: {}",
            ctx.scheduler.pending(),
            get_app_version()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::test_context;
    use crate::commands::handlers::create_all_handlers;

    #[tokio::test]
    async fn test_help_mentions_every_command() {
        let ctx = test_context().await;
        let help = UtilityHandler
            .handle(ctx, &CommandInvocation::parse("help").unwrap())
            .await
            .unwrap();
        for handler in create_all_handlers() {
            for name in handler.command_names() {
                assert!(help.contains(name), "help is missing {name}");
            }
        }
    }

    #[tokio::test]
    async fn test_version_lists_features() {
        let ctx = test_context().await;
        let reply = UtilityHandler
            .handle(ctx, &CommandInvocation::parse("version").unwrap())
            .await
            .unwrap();
        assert!(reply.starts_with("MediMate v1.4.0"));
        assert!(reply.contains("• Reminders v2.0.0"));
    }

    #[tokio::test]
    async fn test_status_without_session() {
        let ctx = test_context().await;
        let reply = UtilityHandler
            .handle(ctx, &CommandInvocation::parse("status").unwrap())
            .await
            .unwrap();
        assert!(reply.contains("Session: not logged in"));
        assert!(reply.contains("Pending reminders: 0"));
    }
}
