//! Medicine command handlers
//!
//! Handles: medicines, add-med, edit-med, take
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;

use super::{require_caretaker, require_session};
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::{local_today, Medicine, NewMedicine, TimeOfDay};

pub struct MedicineHandler;

#[async_trait]
impl CommandHandler for MedicineHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["medicines", "add-med", "edit-med", "take"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "medicines" => self.handle_list(&ctx).await,
            "add-med" => self.handle_add(&ctx, invocation).await,
            "edit-med" => self.handle_edit(&ctx, invocation).await,
            "take" => self.handle_take(&ctx, invocation).await,
            other => Err(anyhow!("MedicineHandler cannot handle '{}'", other)),
        }
    }
}

impl MedicineHandler {
    async fn handle_list(&self, ctx: &CommandContext) -> Result<String> {
        let (state, _) = require_session(ctx).await?;
        if state.medicines.is_empty() {
            return Ok("No medicines yet. Add one with 'add-med'.".to_string());
        }

        let today = local_today();
        let mut medicines: Vec<&Medicine> = state.medicines.iter().collect();
        medicines.sort_by_key(|m| m.time);

        let mut lines = vec!["💊 Medicines:".to_string()];
        for medicine in medicines {
            lines.push(format!(
                "  [{}] {}  {} ({}) - stock {}{} [id {}]",
                if state.is_taken_on(&medicine.id, today) { "x" } else { " " },
                medicine.time,
                medicine.name,
                medicine.dosage,
                medicine.stock,
                if medicine.is_low_stock() { " ⚠️ low" } else { "" },
                medicine.id
            ));
        }
        Ok(lines.join("\n"))
    }

    /// `add-med <name> <dosage> <HH:MM> <stock> <threshold>`
    async fn handle_add(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "add medicines").await?;
        let medicine = NewMedicine {
            name: invocation.require(0, "name")?.trim().to_string(),
            dosage: invocation.require(1, "dosage")?.trim().to_string(),
            time: invocation.parse_arg::<TimeOfDay>(2, "time")?,
            stock: invocation.parse_arg(3, "stock")?,
            stock_threshold: invocation.parse_arg(4, "threshold")?,
        };
        if medicine.name.is_empty() {
            bail!("Medicine name cannot be empty");
        }

        let added = ctx.store.lock().await.add_medicine(medicine).await?;
        let scheduled = ctx.reschedule_reminders().await;
        Ok(format!(
            "✅ Added {} ({}) at {} [id {}]. {scheduled} reminder(s) scheduled.",
            added.name, added.dosage, added.time, added.id
        ))
    }

    /// `edit-med <id> field=value...` with fields name, dosage, time, stock, threshold
    async fn handle_edit(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "edit medicines").await?;
        let id = invocation.require(0, "medicine id")?;
        if invocation.args.len() < 2 {
            bail!("Nothing to change. Use field=value with name, dosage, time, stock or threshold");
        }

        let (state, _) = require_session(ctx).await?;
        let mut medicine = state
            .medicines
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown medicine id: {}", id))?;

        for assignment in &invocation.args[1..] {
            apply_edit(&mut medicine, assignment)?;
        }

        let name = medicine.name.clone();
        ctx.store.lock().await.update_medicine(medicine).await?;
        let scheduled = ctx.reschedule_reminders().await;
        Ok(format!("✏️ Updated {name}. {scheduled} reminder(s) scheduled."))
    }

    /// `take <id>` toggles today's taken mark
    async fn handle_take(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "mark medicines as taken").await?;
        let id = invocation.require(0, "medicine id")?;
        let mut store = ctx.store.lock().await;
        let taken = store.toggle_medicine_taken(id).await?;
        let name = store
            .state()
            .medicines
            .iter()
            .find(|m| m.id == id)
            .map(|m| m.name.clone())
            .unwrap_or_else(|| id.to_string());

        Ok(if taken {
            format!("✅ {name} marked as taken today")
        } else {
            format!("↩️ {name} unmarked for today")
        })
    }
}

fn apply_edit(medicine: &mut Medicine, assignment: &str) -> Result<()> {
    let (field, value) = assignment
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected field=value, got '{}'", assignment))?;
    let value = value.trim();
    match field.trim().to_lowercase().as_str() {
        "name" if !value.is_empty() => medicine.name = value.to_string(),
        "dosage" => medicine.dosage = value.to_string(),
        "time" => medicine.time = value.parse()?,
        "stock" => {
            medicine.stock = value
                .parse()
                .map_err(|e| anyhow!("Invalid stock '{}': {}", value, e))?
        }
        "threshold" => {
            medicine.stock_threshold = value
                .parse()
                .map_err(|e| anyhow!("Invalid threshold '{}': {}", value, e))?
        }
        "name" => bail!("Medicine name cannot be empty"),
        other => bail!("Unknown medicine field: {}", other),
    }
    Ok(())
}
