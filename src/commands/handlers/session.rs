//! Session command handlers
//!
//! Handles: login, signup, logout, whoami
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::UserRole;
use crate::features::patients::generate_patient_id;

pub struct SessionHandler;

#[async_trait]
impl CommandHandler for SessionHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["login", "signup", "logout", "whoami"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "login" => self.handle_login(&ctx, invocation).await,
            "signup" => self.handle_signup(&ctx, invocation).await,
            "logout" => self.handle_logout(&ctx).await,
            "whoami" => self.handle_whoami(&ctx).await,
            other => Err(anyhow!("SessionHandler cannot handle '{}'", other)),
        }
    }
}

impl SessionHandler {
    /// `login <patient-id> [caretaker|family]`
    async fn handle_login(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let patient_id = invocation.require(0, "patient id")?;
        let role = match invocation.arg(1) {
            Some(_) => invocation.parse_arg::<UserRole>(1, "role")?,
            None => UserRole::Caretaker,
        };
        login_and_schedule(ctx, patient_id, role).await
    }

    /// `signup <patient name...> [--family]`
    async fn handle_signup(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let name = invocation.positional().join(" ");
        if name.trim().is_empty() {
            return Err(anyhow!("Missing patient name parameter"));
        }
        let role = if invocation.has_flag("--family") {
            UserRole::Family
        } else {
            UserRole::Caretaker
        };

        let patient_id = generate_patient_id(&name, &mut rand::rng())?;
        info!("Generated patient id {patient_id} for new profile");
        let reply = login_and_schedule(ctx, &patient_id, role).await?;
        Ok(format!(
            "🆕 Your Patient ID is {patient_id}\nKeep it safe: it is the only way to open this profile again.\n{reply}"
        ))
    }

    async fn handle_logout(&self, ctx: &CommandContext) -> Result<String> {
        let was_logged_in = {
            let mut store = ctx.store.lock().await;
            let was = store.is_logged_in();
            store.logout();
            was
        };
        ctx.messaging.close_conversation();
        ctx.reschedule_reminders().await;

        Ok(if was_logged_in {
            "👋 Logged out. Your data stays on this device.".to_string()
        } else {
            "Not logged in.".to_string()
        })
    }

    async fn handle_whoami(&self, ctx: &CommandContext) -> Result<String> {
        let store = ctx.store.lock().await;
        Ok(match store.session() {
            Some(session) => format!("{} ({})", session.patient_id, session.role),
            None => "Not logged in.".to_string(),
        })
    }
}

/// Log in and schedule the rest of today's reminders
pub async fn login_and_schedule(
    ctx: &CommandContext,
    patient_id: &str,
    role: UserRole,
) -> Result<String> {
    ctx.store.lock().await.login(patient_id, role).await?;
    ctx.messaging.close_conversation();
    let scheduled = ctx.reschedule_reminders().await;
    Ok(format!(
        "✅ Logged in as {role} for {}. {scheduled} reminder(s) scheduled for today.",
        patient_id.trim()
    ))
}
