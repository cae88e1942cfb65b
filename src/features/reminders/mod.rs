//! # Reminders Feature
//!
//! Same-day medicine and appointment alarms raised as system notifications.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: true
//!
//! ## Changelog
//! - 2.0.0: Plan from care state; notifier seam with sound and vibration
//! - 1.0.0: Initial release

pub mod notifier;
pub mod scheduler;

pub use crate::core::NotificationPermission;
pub use notifier::{LogNotifier, NotificationTemplates, Notifier, SystemNotification};
pub use scheduler::{plan_reminders, PlannedReminder, ReminderHandle, ReminderKind, ReminderScheduler};
