//! Profile command handlers
//!
//! Handles: settings, set, theme, export
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;

use super::require_session;
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::{LeadTime, NotificationSettings, Theme};
use crate::features::export::write_report;

pub struct SettingsHandler;

#[async_trait]
impl CommandHandler for SettingsHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["settings", "set", "theme", "export"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "settings" => {
                let (state, _) = require_session(&ctx).await?;
                Ok(render_settings(&state.notification_settings))
            }
            "set" => self.handle_set(&ctx, invocation).await,
            "theme" => self.handle_theme(&ctx, invocation).await,
            "export" => self.handle_export(&ctx, invocation).await,
            other => Err(anyhow!("SettingsHandler cannot handle '{}'", other)),
        }
    }
}

impl SettingsHandler {
    /// `set <key> <value>`
    async fn handle_set(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let key = invocation.require(0, "setting")?;
        let value = invocation.require(1, "value")?;

        let (state, _) = require_session(ctx).await?;
        let mut settings = state.notification_settings;
        apply_setting(&mut settings, key, value)?;

        ctx.store
            .lock()
            .await
            .set_notification_settings(settings)
            .await?;
        let scheduled = ctx.reschedule_reminders().await;
        Ok(format!(
            "⚙️ {key} set to {value}. {scheduled} reminder(s) scheduled."
        ))
    }

    /// `theme [light|dark]`, toggles without an argument
    async fn handle_theme(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let store = ctx.store.lock().await;
        let theme = match invocation.arg(0).map(|t| t.to_lowercase()) {
            Some(t) if t == "light" => Theme::Light,
            Some(t) if t == "dark" => Theme::Dark,
            Some(other) => bail!("Unknown theme: {} (use light or dark)", other),
            None => store.theme().await.toggled(),
        };
        store.set_theme(theme).await?;
        Ok(format!(
            "🎨 Theme: {}",
            match theme {
                Theme::Light => "light",
                Theme::Dark => "dark",
            }
        ))
    }

    /// `export [directory]`
    async fn handle_export(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        let (state, _) = require_session(ctx).await?;
        let dir = invocation
            .arg(0)
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.export_dir.clone());
        let path = write_report(&dir, &state, &Local::now()).await?;
        Ok(format!("📄 Exported last 30 days to {}", path.display()))
    }
}

fn apply_setting(settings: &mut NotificationSettings, key: &str, value: &str) -> Result<()> {
    match key.to_lowercase().as_str() {
        "medicine-sound" => settings.medicine_sound = value.parse()?,
        "medicine-vibration" => settings.medicine_vibration = value.parse()?,
        "appointment-sound" => settings.appointment_sound = value.parse()?,
        "appointment-vibration" => settings.appointment_vibration = value.parse()?,
        "lead-time" => {
            let minutes: u32 = value
                .parse()
                .map_err(|e| anyhow!("Invalid lead time '{}': {}", value, e))?;
            settings.appointment_interval = LeadTime::try_from(minutes).map_err(|e| anyhow!(e))?;
        }
        other => bail!(
            "Unknown setting: {} (medicine-sound, medicine-vibration, appointment-sound, appointment-vibration, lead-time)",
            other
        ),
    }
    Ok(())
}

fn render_settings(settings: &NotificationSettings) -> String {
    [
        "⚙️ Notification settings:".to_string(),
        format!("  medicine-sound         {:?}", settings.medicine_sound).to_lowercase(),
        format!("  medicine-vibration     {:?}", settings.medicine_vibration).to_lowercase(),
        format!("  appointment-sound      {:?}", settings.appointment_sound).to_lowercase(),
        format!("  appointment-vibration  {:?}", settings.appointment_vibration).to_lowercase(),
        format!("  lead-time              {} min", settings.appointment_interval.minutes()),
    ]
    .join("\n")
}
