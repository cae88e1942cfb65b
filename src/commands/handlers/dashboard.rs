//! Dashboard command handler
//!
//! Handles: dashboard, home
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;

use super::require_session;
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::UserRole;
use crate::features::dashboard::DashboardView;

pub struct DashboardHandler;

#[async_trait]
impl CommandHandler for DashboardHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["dashboard", "home"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        _invocation: &CommandInvocation,
    ) -> Result<String> {
        let (state, role) = require_session(&ctx).await?;
        let now = Local::now();
        let view = DashboardView::build(&state, role, &now);
        Ok(render(&view, &now.format("%A %d %B, %H:%M").to_string()))
    }
}

/// Plain-text rendering of the dashboard
pub fn render(view: &DashboardView, heading: &str) -> String {
    let mut lines = vec![format!("📋 Dashboard ({}) - {heading}", view.role), String::new()];

    match view.next_medicine() {
        Some(next) => lines.push(format!(
            "⏰ Next medication: {} ({}) at {}",
            next.name, next.dosage, next.time
        )),
        None => lines.push("⏰ No more medications due today".to_string()),
    }
    if view.upcoming.len() > 1 {
        lines.push("Upcoming:".to_string());
        for medicine in view.upcoming.iter().skip(1) {
            lines.push(format!("  {}  {} ({})", medicine.time, medicine.name, medicine.dosage));
        }
    }

    lines.push(String::new());
    lines.push("💊 All medications:".to_string());
    for status in &view.medications {
        lines.push(format!(
            "  [{}] {}  {} ({}) [id {}]",
            if status.taken_today { "x" } else { " " },
            status.medicine.time,
            status.medicine.name,
            status.medicine.dosage,
            status.medicine.id
        ));
    }

    if !view.low_stock.is_empty() {
        lines.push(String::new());
        lines.push("⚠️ Low stock:".to_string());
        for medicine in &view.low_stock {
            lines.push(format!("  - {} ({} left)", medicine.name, medicine.stock));
        }
    }

    lines.push(String::new());
    lines.push("📅 Today's appointments:".to_string());
    if view.todays_appointments.is_empty() {
        lines.push("  none".to_string());
    }
    for appointment in &view.todays_appointments {
        lines.push(format!(
            "  {}  {}, {}",
            appointment.time, appointment.doctor, appointment.clinic
        ));
    }

    let hydration = view.hydration;
    lines.push(String::new());
    lines.push(format!(
        "💧 Hydration: {}/{} glasses{}",
        hydration.count,
        hydration.goal,
        if hydration.goal_reached() { " - goal reached! 🎉" } else { "" }
    ));

    // Check-ins are recorded by the caretaker only
    if view.role == UserRole::Caretaker {
        if view.logged_recently {
            lines.push("🙂 Checked in recently. Thanks!".to_string());
        } else {
            lines.push(format!(
                "🙂 {} (use 'checkin <feeling> [note]')",
                view.check_in_prompt.text()
            ));
        }
    }
    for entry in &view.todays_check_ins {
        lines.push(format!(
            "  {} {}{}",
            entry.timestamp.with_timezone(&Local).format("%H:%M"),
            entry.feeling,
            entry.note.as_deref().map(|n| format!(": {n}")).unwrap_or_default()
        ));
    }

    if view.unread_messages > 0 {
        lines.push(String::new());
        lines.push(format!("✉️ {} unread message(s)", view.unread_messages));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::{logged_in_context, test_context};
    use crate::features::store::{seed, CareState};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[tokio::test]
    async fn test_requires_login() {
        let ctx = test_context().await;
        let invocation = CommandInvocation::parse("dashboard").unwrap();
        assert!(DashboardHandler.handle(ctx, &invocation).await.is_err());
    }

    #[tokio::test]
    async fn test_lists_all_medications() {
        let ctx = logged_in_context(UserRole::Caretaker).await;
        let invocation = CommandInvocation::parse("home").unwrap();
        let reply = DashboardHandler.handle(ctx, &invocation).await.unwrap();
        for name in ["Metformin", "Amlodipine", "Atorvastatin", "Vitamin D"] {
            assert!(reply.contains(name), "missing {name}");
        }
        assert!(reply.contains("Hydration: 0/8"));
    }

    #[test]
    fn test_render_marks_taken_and_low_stock() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let mut state = CareState {
            medicines: seed::initial_medicines(),
            ..Default::default()
        };
        state.taken.insert("1".into(), today);
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 7, 0, 0).unwrap();
        let view = DashboardView::build(&state, UserRole::Caretaker, &now);

        let text = render(&view, "test");
        assert!(text.contains("Next medication: Amlodipine"));
        assert!(text.contains("[x] 08:00  Metformin"));
        assert!(text.contains("[ ] 08:00  Amlodipine"));
        assert!(text.contains("- Atorvastatin (8 left)"));
        assert!(text.contains("use 'checkin <feeling> [note]'"));

        let family = DashboardView::build(&state, UserRole::Family, &now);
        assert!(!render(&family, "test").contains("checkin"));
    }
}
