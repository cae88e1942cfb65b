//! Per-command handler implementations
//!
//! - **Version**: 3.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 3.0.0: Console handlers for the care companion
//! - 1.0.0: Initial extraction from monolithic command handler

pub mod appointments;
pub mod assistant;
pub mod dashboard;
pub mod emergency;
pub mod medicines;
pub mod messages;
pub mod session;
pub mod settings;
pub mod utility;
pub mod wellness;

use anyhow::{anyhow, bail, Result};
use std::sync::Arc;

use super::context::CommandContext;
use super::handler::CommandHandler;
use crate::core::UserRole;
use crate::features::store::CareState;

/// Create all registered command handlers
pub fn create_all_handlers() -> Vec<Arc<dyn CommandHandler>> {
    vec![
        Arc::new(utility::UtilityHandler),
        Arc::new(session::SessionHandler),
        Arc::new(dashboard::DashboardHandler),
        Arc::new(medicines::MedicineHandler),
        Arc::new(appointments::AppointmentHandler),
        Arc::new(wellness::WellnessHandler),
        Arc::new(messages::MessagesHandler),
        Arc::new(assistant::AssistantHandler),
        Arc::new(settings::SettingsHandler),
        Arc::new(emergency::EmergencyHandler),
    ]
}

const NOT_LOGGED_IN: &str = "Not logged in. Use 'login <patient-id>' or 'signup <name>' first.";

/// Current state and role, or a hint to log in first
pub(crate) async fn require_session(ctx: &CommandContext) -> Result<(CareState, UserRole)> {
    ctx.snapshot().await.ok_or_else(|| anyhow!(NOT_LOGGED_IN))
}

/// Family members get a read-only view; `action` completes "Only the caretaker can ..."
pub(crate) async fn require_caretaker(ctx: &CommandContext, action: &str) -> Result<()> {
    let role = ctx.store.lock().await.session().map(|session| session.role);
    match role {
        None => bail!(NOT_LOGGED_IN),
        Some(UserRole::Caretaker) => Ok(()),
        Some(other) => bail!("Only the caretaker can {action}. The {other} view is read-only."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::test_support::{logged_in_context, test_context};
    use crate::commands::registry::CommandRegistry;

    #[test]
    fn test_no_command_name_collisions() {
        let handlers = create_all_handlers();
        let total: usize = handlers.iter().map(|h| h.command_names().len()).sum();

        let mut registry = CommandRegistry::new();
        for handler in handlers {
            registry.register(handler);
        }
        assert_eq!(registry.len(), total);
    }

    #[tokio::test]
    async fn test_require_caretaker() {
        let ctx = test_context().await;
        assert!(require_caretaker(&ctx, "add medicines").await.is_err());

        let caretaker = logged_in_context(UserRole::Caretaker).await;
        assert!(require_caretaker(&caretaker, "add medicines").await.is_ok());

        let family = logged_in_context(UserRole::Family).await;
        let err = require_caretaker(&family, "add medicines").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Only the caretaker can add medicines. The family view is read-only."
        );
    }
}
