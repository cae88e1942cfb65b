//! Appointment command handlers
//!
//! Handles: appointments, add-appt
//!
//! - **Version**: 1.0.0
//! - **Since**: 2.0.0

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use std::sync::Arc;

use super::{require_caretaker, require_session};
use crate::commands::context::CommandContext;
use crate::commands::handler::CommandHandler;
use crate::commands::input::CommandInvocation;
use crate::core::{local_today, Appointment, NewAppointment, TimeOfDay};

pub struct AppointmentHandler;

#[async_trait]
impl CommandHandler for AppointmentHandler {
    fn command_names(&self) -> &'static [&'static str] {
        &["appointments", "add-appt"]
    }

    async fn handle(
        &self,
        ctx: Arc<CommandContext>,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        match invocation.name.as_str() {
            "appointments" => self.handle_list(&ctx).await,
            "add-appt" => self.handle_add(&ctx, invocation).await,
            other => Err(anyhow!("AppointmentHandler cannot handle '{}'", other)),
        }
    }
}

impl AppointmentHandler {
    async fn handle_list(&self, ctx: &CommandContext) -> Result<String> {
        let (state, _) = require_session(ctx).await?;
        if state.appointments.is_empty() {
            return Ok("No appointments. Add one with 'add-appt'.".to_string());
        }

        let today = local_today();
        let mut appointments: Vec<&Appointment> = state.appointments.iter().collect();
        appointments.sort_by_key(|a| (a.date, a.time));

        let mut lines = vec!["📅 Appointments:".to_string()];
        for appointment in appointments {
            let marker = if appointment.date == today {
                " (today)"
            } else if appointment.date < today {
                " (past)"
            } else {
                ""
            };
            lines.push(format!(
                "  {} {}  {}, {}{marker}",
                appointment.date, appointment.time, appointment.doctor, appointment.clinic
            ));
        }
        Ok(lines.join("\n"))
    }

    /// `add-appt <doctor> <clinic> <YYYY-MM-DD|today|tomorrow> <HH:MM>`
    async fn handle_add(
        &self,
        ctx: &CommandContext,
        invocation: &CommandInvocation,
    ) -> Result<String> {
        require_caretaker(ctx, "add appointments").await?;
        let appointment = NewAppointment {
            doctor: invocation.require(0, "doctor")?.trim().to_string(),
            clinic: invocation.require(1, "clinic")?.trim().to_string(),
            date: parse_date(invocation.require(2, "date")?, local_today())?,
            time: invocation.parse_arg::<TimeOfDay>(3, "time")?,
        };

        let added = ctx.store.lock().await.add_appointment(appointment).await?;
        let scheduled = ctx.reschedule_reminders().await;
        Ok(format!(
            "✅ Appointment with {} at {} on {} {}. {scheduled} reminder(s) scheduled.",
            added.doctor, added.clinic, added.date, added.time
        ))
    }
}

/// Accepts `YYYY-MM-DD`, `today` or `tomorrow`
fn parse_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    match input.trim().to_lowercase().as_str() {
        "today" => Ok(today),
        "tomorrow" => today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| anyhow!("Date out of range")),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|e| anyhow!("Invalid date '{}' (use YYYY-MM-DD): {}", other, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::logged_in_context;
    use crate::core::UserRole;

    #[test]
    fn test_parse_date() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        assert_eq!(parse_date("today", today).unwrap(), today);
        assert_eq!(
            parse_date("Tomorrow", today).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
        );
        assert_eq!(
            parse_date("2024-06-12", today).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
        );
        assert!(parse_date("12/06/2024", today).is_err());
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let ctx = logged_in_context(UserRole::Caretaker).await;
        let add = CommandInvocation::parse(r#"add-appt "Dr. Rao" "Eye Clinic" 2099-01-05 09:15"#).unwrap();
        let reply = AppointmentHandler.handle(ctx.clone(), &add).await.unwrap();
        assert!(reply.contains("Dr. Rao at Eye Clinic on 2099-01-05 09:15"));

        let list = CommandInvocation::parse("appointments").unwrap();
        let listing = AppointmentHandler.handle(ctx, &list).await.unwrap();
        assert!(listing.contains("Dr. Smith, Cardiology Clinic (today)"));
        assert!(listing.contains("2099-01-05 09:15  Dr. Rao, Eye Clinic"));
    }

    #[tokio::test]
    async fn test_family_cannot_add_appointments() {
        let ctx = logged_in_context(UserRole::Family).await;
        let add = CommandInvocation::parse(r#"add-appt "Dr. Rao" "Eye Clinic" 2099-01-05 09:15"#).unwrap();
        let err = AppointmentHandler.handle(ctx.clone(), &add).await.unwrap_err();
        assert!(err.to_string().starts_with("Only the caretaker can add appointments"));
        assert_eq!(ctx.store.lock().await.state().appointments.len(), 1);

        let list = CommandInvocation::parse("appointments").unwrap();
        assert!(AppointmentHandler.handle(ctx, &list).await.is_ok());
    }
}
