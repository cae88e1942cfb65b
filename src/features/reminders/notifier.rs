//! System notification seam
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Carry the configured sound on each notification
//! - 1.0.0: Initial release with LogNotifier

use anyhow::Result;
use log::info;
use std::fmt;

use crate::core::{Appointment, Medicine, NotificationPermission, SoundChoice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemNotification {
    pub title: String,
    pub body: String,
    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,
    pub sound: SoundChoice,
    /// Dedup tag, e.g. `med-1-08:00`
    pub tag: String,
}

impl fmt::Display for SystemNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.body)
    }
}

/// Something that can put a notification in front of the user
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    fn show(&self, notification: &SystemNotification) -> Result<()>;
}

/// Notifier for headless and console use: writes notifications to the log
pub struct LogNotifier {
    permission: NotificationPermission,
}

impl LogNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        LogNotifier { permission }
    }
}

impl Notifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn show(&self, notification: &SystemNotification) -> Result<()> {
        info!(
            "🔔 {} [tag={}, vibrate={:?}, sound={:?}]",
            notification, notification.tag, notification.vibrate, notification.sound
        );
        Ok(())
    }
}

/// Title and body templates. Bodies use `{medicationName}`, `{doctorName}` and `{time}`.
#[derive(Debug, Clone)]
pub struct NotificationTemplates {
    pub medicine_title: String,
    pub medicine_body: String,
    pub appointment_title: String,
    pub appointment_body: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        NotificationTemplates {
            medicine_title: "Next Medication".to_string(),
            medicine_body: "It's time to take {medicationName} at {time}.".to_string(),
            appointment_title: "Today's Appointments".to_string(),
            appointment_body: "Upcoming appointment with {doctorName} at {time}.".to_string(),
        }
    }
}

impl NotificationTemplates {
    pub fn medicine_body_for(&self, medicine: &Medicine) -> String {
        let time = medicine.time.to_string();
        substitute(
            &self.medicine_body,
            &[("medicationName", medicine.name.as_str()), ("time", time.as_str())],
        )
    }

    pub fn appointment_body_for(&self, appointment: &Appointment) -> String {
        let time = appointment.time.to_string();
        substitute(
            &self.appointment_body,
            &[("doctorName", appointment.doctor.as_str()), ("time", time.as_str())],
        )
    }
}

/// Replace `{key}` placeholders
fn substitute(template: &str, params: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in params {
        result = result.replace(&format!("{{{key}}}"), value);
    }
    result
}
