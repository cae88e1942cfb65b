//! Shared context for command handlers
//!
//! - **Version**: 2.0.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 2.0.0: Patient store, reminder scheduler, messaging and assistant services
//! - 1.0.0: Initial implementation with core shared state

use log::debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::core::UserRole;
use crate::features::assistant::AiAssistant;
use crate::features::messaging::MessagingBackend;
use crate::features::reminders::ReminderScheduler;
use crate::features::store::{CareState, SharedStore};

/// Services every command handler can reach
#[derive(Clone)]
pub struct CommandContext {
    pub store: SharedStore,
    pub scheduler: Arc<ReminderScheduler>,
    pub messaging: Arc<dyn MessagingBackend>,
    pub assistant: Arc<AiAssistant>,
    /// Where `export` writes its CSV
    pub export_dir: PathBuf,
    pub start_time: Instant,
}

impl CommandContext {
    pub fn new(
        store: SharedStore,
        scheduler: Arc<ReminderScheduler>,
        messaging: Arc<dyn MessagingBackend>,
        assistant: Arc<AiAssistant>,
        export_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            scheduler,
            messaging,
            assistant,
            export_dir,
            start_time: Instant::now(),
        }
    }

    /// Snapshot of the current state with the viewer's role, if logged in
    pub async fn snapshot(&self) -> Option<(CareState, UserRole)> {
        let store = self.store.lock().await;
        store
            .session()
            .map(|session| (store.state().clone(), session.role))
    }

    /// Cancel every pending reminder and plan again from current state.
    /// Must not be called while holding the store lock.
    pub async fn reschedule_reminders(&self) -> usize {
        match self.snapshot().await {
            Some((state, _)) => self.scheduler.reschedule_for(&state),
            None => {
                debug!("No session, cancelling reminders");
                self.scheduler.cancel_all();
                0
            }
        }
    }
}
