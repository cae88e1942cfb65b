//! Same-day reminder scheduling
//!
//! Planning is a pure function of the medicine list, appointment list,
//! settings and "now". Scheduling turns each planned reminder into a one-shot
//! tokio timer. Every change reschedules from scratch: cancel all, plan again.
//! Nothing is persisted, and reminders whose time passed while the process was
//! not running are not caught up.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: reschedule() owns the active handle (cancel-all, reschedule-all)
//! - 1.0.0: Initial release

use chrono::{DateTime, Duration as ChronoDuration, Local, NaiveDateTime, TimeZone};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;

use super::notifier::{NotificationTemplates, Notifier, SystemNotification};
use crate::core::{local_now, Appointment, Medicine, NotificationPermission, NotificationSettings};
use crate::features::store::CareState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderKind {
    Medicine,
    Appointment,
}

/// A reminder that should fire later today
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedReminder {
    pub kind: ReminderKind,
    pub entity_id: String,
    pub fire_at: NaiveDateTime,
    pub notification: SystemNotification,
}

/// Compute today's remaining reminders, earliest first.
///
/// A medicine fires at its time of day if that is strictly after `now`. An
/// appointment dated today fires `lead time` minutes before it starts, if that
/// instant is strictly after `now`.
pub fn plan_reminders(
    medicines: &[Medicine],
    appointments: &[Appointment],
    settings: &NotificationSettings,
    templates: &NotificationTemplates,
    now: NaiveDateTime,
) -> Vec<PlannedReminder> {
    let today = now.date();
    let mut planned = Vec::new();

    for medicine in medicines {
        let fire_at = medicine.time.on(today);
        if fire_at <= now {
            continue;
        }
        planned.push(PlannedReminder {
            kind: ReminderKind::Medicine,
            entity_id: medicine.id.clone(),
            fire_at,
            notification: SystemNotification {
                title: templates.medicine_title.clone(),
                body: templates.medicine_body_for(medicine),
                vibrate: settings.medicine_vibration.pattern().to_vec(),
                sound: settings.medicine_sound,
                tag: format!("med-{}-{}", medicine.id, medicine.time),
            },
        });
    }

    let lead = ChronoDuration::minutes(i64::from(settings.appointment_interval.minutes()));
    for appointment in appointments.iter().filter(|a| a.date == today) {
        let fire_at = appointment.time.on(today) - lead;
        if fire_at <= now {
            continue;
        }
        planned.push(PlannedReminder {
            kind: ReminderKind::Appointment,
            entity_id: appointment.id.clone(),
            fire_at,
            notification: SystemNotification {
                title: templates.appointment_title.clone(),
                body: templates.appointment_body_for(appointment),
                vibrate: settings.appointment_vibration.pattern().to_vec(),
                sound: settings.appointment_sound,
                tag: format!("app-{}-{}", appointment.id, appointment.time),
            },
        });
    }

    planned.sort_by_key(|r| r.fire_at);
    planned
}

/// Pin a wall-clock time to `zone`. Times skipped by a forward DST jump move
/// forward by the size of the jump, the way calendar apps resolve them.
fn resolve_local<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(&local).earliest().or_else(|| {
        zone.from_local_datetime(&(local + ChronoDuration::hours(1)))
            .earliest()
    })
}

/// Real time from `now` until `fire_at`, both wall-clock times in `zone`
fn wall_clock_delay<Tz: TimeZone>(
    zone: &Tz,
    now: NaiveDateTime,
    fire_at: NaiveDateTime,
) -> Option<std::time::Duration> {
    let now = resolve_local(zone, now)?;
    let fire_at = resolve_local(zone, fire_at)?;
    fire_at.signed_duration_since(now).to_std().ok()
}

/// Cancellation handle for one batch of scheduled reminders
#[derive(Default)]
pub struct ReminderHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ReminderHandle {
    /// Abort every timer in this batch that has not fired yet
    pub fn cancel(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    /// Number of timers that have not fired (or been cancelled) yet
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|t| !t.is_finished()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

pub struct ReminderScheduler {
    notifier: Arc<dyn Notifier>,
    templates: NotificationTemplates,
    active: Mutex<Option<ReminderHandle>>,
}

impl ReminderScheduler {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        ReminderScheduler {
            notifier,
            templates: NotificationTemplates::default(),
            active: Mutex::new(None),
        }
    }

    /// Start timers for today's remaining reminders and return their handle
    pub fn schedule(
        &self,
        medicines: &[Medicine],
        appointments: &[Appointment],
        settings: &NotificationSettings,
    ) -> ReminderHandle {
        self.schedule_at(medicines, appointments, settings, local_now())
    }

    pub fn schedule_at(
        &self,
        medicines: &[Medicine],
        appointments: &[Appointment],
        settings: &NotificationSettings,
        now: NaiveDateTime,
    ) -> ReminderHandle {
        let permission = self.notifier.permission();
        if permission != NotificationPermission::Granted {
            debug!("Notification permission is {permission:?}, not scheduling reminders");
            return ReminderHandle::default();
        }

        let planned = plan_reminders(medicines, appointments, settings, &self.templates, now);
        let mut tasks = Vec::with_capacity(planned.len());

        for reminder in planned {
            let Some(delay) = wall_clock_delay(&Local, now, reminder.fire_at) else {
                continue;
            };
            debug!(
                "Scheduling {:?} reminder {} at {} (in {}s)",
                reminder.kind,
                reminder.notification.tag,
                reminder.fire_at,
                delay.as_secs()
            );

            let notifier = Arc::clone(&self.notifier);
            tasks.push(tokio::spawn(async move {
                sleep(delay).await;
                if let Err(e) = notifier.show(&reminder.notification) {
                    warn!("Failed to show notification {}: {e}", reminder.notification.tag);
                }
            }));
        }

        ReminderHandle { tasks }
    }

    /// Cancel whatever is pending and schedule again. Returns the number scheduled.
    pub fn reschedule(
        &self,
        medicines: &[Medicine],
        appointments: &[Appointment],
        settings: &NotificationSettings,
    ) -> usize {
        self.reschedule_at(medicines, appointments, settings, local_now())
    }

    pub fn reschedule_at(
        &self,
        medicines: &[Medicine],
        appointments: &[Appointment],
        settings: &NotificationSettings,
        now: NaiveDateTime,
    ) -> usize {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(mut previous) = active.take() {
            previous.cancel();
        }

        let handle = self.schedule_at(medicines, appointments, settings, now);
        let count = handle.pending();
        info!("Scheduled {count} reminder(s) for the rest of today");
        *active = Some(handle);
        count
    }

    /// Reschedule from a full state snapshot
    pub fn reschedule_for(&self, state: &CareState) -> usize {
        self.reschedule(
            &state.medicines,
            &state.appointments,
            &state.notification_settings,
        )
    }

    pub fn cancel_all(&self) {
        let mut active = self.active.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(mut handle) = active.take() {
            handle.cancel();
            debug!("Cancelled all pending reminders");
        }
    }

    pub fn pending(&self) -> usize {
        self.active
            .lock()
            .map(|active| active.as_ref().map_or(0, ReminderHandle::pending))
            .unwrap_or(0)
    }
}
