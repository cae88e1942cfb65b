//! Per-patient state store
//!
//! Holds every slice for the logged-in patient and writes a slice back to
//! storage after each mutation. A mutation reaches memory only once its slice
//! has been written. Logging out clears memory only; storage is
//! left intact so the same patient id restores its state on the next login.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::backend::StorageBackend;
use super::seed;
use super::slices::{Slice, THEME_KEY};
use crate::core::{
    local_today, Appointment, Feeling, HealthLogEntry, HydrationMap, Medicine, Message,
    NewAppointment, NewMedicine, NotificationSettings, TakenMap, Theme, UserRole,
};
use crate::features::patients::validate_patient_id;

/// Store handle shared between the console, timers and the messaging simulator
pub type SharedStore = Arc<Mutex<PatientStore>>;

/// In-memory copy of every slice for one patient
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CareState {
    pub medicines: Vec<Medicine>,
    pub appointments: Vec<Appointment>,
    pub messages: Vec<Message>,
    pub health_log: Vec<HealthLogEntry>,
    pub hydration: HydrationMap,
    pub taken: TakenMap,
    pub notification_settings: NotificationSettings,
}

impl CareState {
    pub fn is_taken_on(&self, medicine_id: &str, date: NaiveDate) -> bool {
        self.taken.get(medicine_id) == Some(&date)
    }

    pub fn hydration_on(&self, date: NaiveDate) -> u32 {
        self.hydration.get(&date).copied().unwrap_or(0)
    }

    /// Unread messages authored by the other party
    pub fn unread_count(&self, viewer: UserRole) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender != viewer && !m.read)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub patient_id: String,
    pub role: UserRole,
}

pub struct PatientStore {
    storage: Arc<dyn StorageBackend>,
    session: Option<Session>,
    state: CareState,
}

impl PatientStore {
    pub fn new(storage: Arc<dyn StorageBackend>) -> Self {
        PatientStore {
            storage,
            session: None,
            state: CareState::default(),
        }
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn state(&self) -> &CareState {
        &self.state
    }

    fn require_session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| anyhow!("Not logged in"))
    }

    /// Validate the patient id and load every slice for it
    pub async fn login(&mut self, patient_id: &str, role: UserRole) -> Result<()> {
        self.login_on(patient_id, role, local_today()).await
    }

    /// Same as `login`, with an explicit "today" for the seeded appointment
    pub async fn login_on(&mut self, patient_id: &str, role: UserRole, today: NaiveDate) -> Result<()> {
        let patient_id = validate_patient_id(patient_id)?;

        let state = CareState {
            medicines: self
                .load_slice(Slice::Medicines, &patient_id, seed::initial_medicines)
                .await,
            appointments: self
                .load_slice(Slice::Appointments, &patient_id, || {
                    seed::initial_appointments(today)
                })
                .await,
            messages: self
                .load_slice(Slice::Messages, &patient_id, seed::initial_messages)
                .await,
            health_log: self
                .load_slice(Slice::HealthLog, &patient_id, Vec::new)
                .await,
            hydration: self
                .load_slice(Slice::Hydration, &patient_id, HydrationMap::new)
                .await,
            taken: self
                .load_slice(Slice::Taken, &patient_id, TakenMap::new)
                .await,
            notification_settings: self
                .load_slice(
                    Slice::NotificationSettings,
                    &patient_id,
                    NotificationSettings::default,
                )
                .await,
        };

        info!("Logged in as {role} for patient {patient_id}");
        self.state = state;
        self.session = Some(Session { patient_id, role });

        // Seeded defaults become durable on first login
        if let Err(e) = self.persist_all().await {
            warn!("Failed to write back loaded state: {e}");
        }
        Ok(())
    }

    /// Drop all in-memory state; storage is untouched
    pub fn logout(&mut self) {
        if let Some(session) = self.session.take() {
            info!("Logged out of patient {}", session.patient_id);
        }
        self.state = CareState::default();
    }

    /// Read a slice, falling back to `default` when it is missing or unreadable
    async fn load_slice<T, F>(&self, slice: Slice, patient_id: &str, default: F) -> T
    where
        T: DeserializeOwned,
        F: FnOnce() -> T,
    {
        let key = slice.key_for(patient_id);
        match self.storage.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!("Error loading state for \"{slice}\" ({key}): {e}");
                    default()
                }
            },
            Ok(None) => {
                debug!("No stored {slice} for {patient_id}, using defaults");
                default()
            }
            Err(e) => {
                warn!("Storage read failed for {key}: {e}");
                default()
            }
        }
    }

    async fn persist_all(&self) -> Result<()> {
        let state = &self.state;
        self.persist(Slice::Medicines, &state.medicines).await?;
        self.persist(Slice::Appointments, &state.appointments).await?;
        self.persist(Slice::Messages, &state.messages).await?;
        self.persist(Slice::HealthLog, &state.health_log).await?;
        self.persist(Slice::Hydration, &state.hydration).await?;
        self.persist(Slice::Taken, &state.taken).await?;
        self.persist(Slice::NotificationSettings, &state.notification_settings)
            .await
    }

    async fn persist<T: Serialize + ?Sized>(&self, slice: Slice, value: &T) -> Result<()> {
        let session = self.require_session()?;
        let key = slice.key_for(&session.patient_id);
        let json = serde_json::to_string(value)?;
        self.storage.set(&key, &json).await
    }

    pub async fn add_medicine(&mut self, medicine: NewMedicine) -> Result<Medicine> {
        self.require_session()?;
        let id = self.unique_id(|id| self.state.medicines.iter().any(|m| m.id == id));
        let medicine = medicine.with_id(id);
        let mut medicines = self.state.medicines.clone();
        medicines.push(medicine.clone());
        self.persist(Slice::Medicines, &medicines).await?;
        self.state.medicines = medicines;
        info!("Added medicine {} ({})", medicine.name, medicine.id);
        Ok(medicine)
    }

    /// Replace the medicine with the same id
    pub async fn update_medicine(&mut self, medicine: Medicine) -> Result<()> {
        self.require_session()?;
        let mut medicines = self.state.medicines.clone();
        let slot = medicines
            .iter_mut()
            .find(|m| m.id == medicine.id)
            .ok_or_else(|| anyhow!("Unknown medicine id: {}", medicine.id))?;
        *slot = medicine;
        self.persist(Slice::Medicines, &medicines).await?;
        self.state.medicines = medicines;
        Ok(())
    }

    pub async fn add_appointment(&mut self, appointment: NewAppointment) -> Result<Appointment> {
        self.require_session()?;
        let id = self.unique_id(|id| self.state.appointments.iter().any(|a| a.id == id));
        let appointment = appointment.with_id(id);
        let mut appointments = self.state.appointments.clone();
        appointments.push(appointment.clone());
        self.persist(Slice::Appointments, &appointments).await?;
        self.state.appointments = appointments;
        info!(
            "Added appointment with {} on {} at {}",
            appointment.doctor, appointment.date, appointment.time
        );
        Ok(appointment)
    }

    /// Flip today's taken flag. Returns true if the medicine is now taken.
    pub async fn toggle_medicine_taken(&mut self, medicine_id: &str) -> Result<bool> {
        self.toggle_medicine_taken_on(medicine_id, local_today()).await
    }

    pub async fn toggle_medicine_taken_on(&mut self, medicine_id: &str, today: NaiveDate) -> Result<bool> {
        self.require_session()?;
        if !self.state.medicines.iter().any(|m| m.id == medicine_id) {
            bail!("Unknown medicine id: {}", medicine_id);
        }

        let mut taken_map = self.state.taken.clone();
        let taken = if self.state.is_taken_on(medicine_id, today) {
            taken_map.remove(medicine_id);
            false
        } else {
            taken_map.insert(medicine_id.to_string(), today);
            true
        };
        self.persist(Slice::Taken, &taken_map).await?;
        self.state.taken = taken_map;
        Ok(taken)
    }

    /// Add `delta` glasses to today's count, never going below zero
    pub async fn adjust_hydration(&mut self, delta: i32) -> Result<u32> {
        self.adjust_hydration_on(local_today(), delta).await
    }

    pub async fn adjust_hydration_on(&mut self, date: NaiveDate, delta: i32) -> Result<u32> {
        self.require_session()?;
        let current = i64::from(self.state.hydration_on(date));
        let updated = (current + i64::from(delta)).clamp(0, i64::from(u32::MAX)) as u32;
        let mut hydration = self.state.hydration.clone();
        hydration.insert(date, updated);
        self.persist(Slice::Hydration, &hydration).await?;
        self.state.hydration = hydration;
        Ok(updated)
    }

    pub async fn add_health_log(
        &mut self,
        feeling: Feeling,
        note: Option<String>,
        prompt: &str,
    ) -> Result<HealthLogEntry> {
        self.add_health_log_at(feeling, note, prompt, Utc::now()).await
    }

    /// Insert a check-in and keep the log newest-first
    pub async fn add_health_log_at(
        &mut self,
        feeling: Feeling,
        note: Option<String>,
        prompt: &str,
        at: DateTime<Utc>,
    ) -> Result<HealthLogEntry> {
        self.require_session()?;
        let entry = HealthLogEntry {
            id: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            timestamp: at,
            feeling,
            note: note
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            prompt: prompt.to_string(),
        };
        let mut health_log = self.state.health_log.clone();
        health_log.push(entry.clone());
        health_log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        self.persist(Slice::HealthLog, &health_log).await?;
        self.state.health_log = health_log;
        Ok(entry)
    }

    pub async fn append_message(&mut self, message: Message) -> Result<()> {
        self.require_session()?;
        let mut messages = self.state.messages.clone();
        messages.push(message);
        self.commit_messages(messages).await
    }

    /// Append a new unread message authored by `sender`
    pub async fn send_message(&mut self, text: &str, sender: UserRole) -> Result<Message> {
        self.require_session()?;
        let text = text.trim();
        if text.is_empty() {
            bail!("Message text is empty");
        }
        let id = self.unique_id(|id| self.state.messages.iter().any(|m| m.id == id));
        let message = Message {
            id,
            text: text.to_string(),
            sender,
            timestamp: Local::now().format("%I:%M %p").to_string(),
            read: false,
        };
        self.append_message(message.clone()).await?;
        Ok(message)
    }

    /// Mark one message read. Returns false if it was unknown or already read.
    pub async fn mark_message_read(&mut self, message_id: &str) -> Result<bool> {
        self.require_session()?;
        let mut messages = self.state.messages.clone();
        let changed = match messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) if !message.read => {
                message.read = true;
                true
            }
            _ => false,
        };
        if changed {
            self.commit_messages(messages).await?;
        }
        Ok(changed)
    }

    /// Mark every unread message from the other party as read
    pub async fn mark_incoming_read(&mut self, viewer: UserRole) -> Result<usize> {
        self.require_session()?;
        let mut messages = self.state.messages.clone();
        let mut changed = 0;
        for message in messages
            .iter_mut()
            .filter(|m| m.sender != viewer && !m.read)
        {
            message.read = true;
            changed += 1;
        }
        if changed > 0 {
            self.commit_messages(messages).await?;
        }
        Ok(changed)
    }

    async fn commit_messages(&mut self, messages: Vec<Message>) -> Result<()> {
        self.persist(Slice::Messages, &messages).await?;
        self.state.messages = messages;
        Ok(())
    }

    pub async fn set_notification_settings(&mut self, settings: NotificationSettings) -> Result<()> {
        self.require_session()?;
        self.persist(Slice::NotificationSettings, &settings).await?;
        self.state.notification_settings = settings;
        Ok(())
    }

    /// Device theme, readable without a session
    pub async fn theme(&self) -> Theme {
        match self.storage.get(THEME_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable theme value: {e}");
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Storage read failed for {THEME_KEY}: {e}");
                Theme::default()
            }
        }
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        let json = serde_json::to_string(&theme)?;
        self.storage.set(THEME_KEY, &json).await
    }

    /// ISO timestamp id, suffixed if it collides with an existing one
    fn unique_id<F>(&self, exists: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let base = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        if !exists(&base) {
            return base;
        }
        (1..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| !exists(candidate))
            .unwrap_or(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{LeadTime, TimeOfDay, VibrationChoice};
    use crate::features::store::MemoryStorage;
    use chrono::TimeZone;

    const PATIENT: &str = "MEDIMATE-JANE-1234";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    /// Memory storage whose writes can be switched to fail
    #[derive(Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        fail_writes: std::sync::atomic::AtomicBool,
    }

    #[async_trait::async_trait]
    impl StorageBackend for FlakyStorage {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<()> {
            if self.fail_writes.load(std::sync::atomic::Ordering::SeqCst) {
                bail!("disk full");
            }
            self.inner.set(key, value).await
        }
    }

    async fn logged_in() -> (PatientStore, MemoryStorage) {
        let storage = MemoryStorage::new();
        let mut store = PatientStore::new(Arc::new(storage.clone()));
        store
            .login_on(PATIENT, UserRole::Caretaker, day(10))
            .await
            .unwrap();
        (store, storage)
    }

    #[tokio::test]
    async fn test_login_seeds_new_profile() {
        let (store, _) = logged_in().await;
        let state = store.state();
        assert_eq!(state.medicines.len(), 4);
        assert_eq!(state.appointments.len(), 1);
        assert_eq!(state.appointments[0].date, day(10));
        assert_eq!(state.messages.len(), 3);
        assert!(state.health_log.is_empty());
        assert_eq!(state.notification_settings, NotificationSettings::default());
    }

    #[tokio::test]
    async fn test_login_rejects_invalid_id() {
        let mut store = PatientStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.login("JANE-1234", UserRole::Family).await.is_err());
        assert!(!store.is_logged_in());
    }

    #[tokio::test]
    async fn test_toggle_taken_twice_restores() {
        let (mut store, _) = logged_in().await;
        assert!(store.toggle_medicine_taken_on("1", day(10)).await.unwrap());
        assert!(store.state().is_taken_on("1", day(10)));
        assert!(!store.toggle_medicine_taken_on("1", day(10)).await.unwrap());
        assert!(!store.state().is_taken_on("1", day(10)));
        assert!(store.state().taken.is_empty());
    }

    #[tokio::test]
    async fn test_taken_yesterday_is_not_taken_today() {
        let (mut store, _) = logged_in().await;
        store.toggle_medicine_taken_on("2", day(9)).await.unwrap();
        assert!(!store.state().is_taken_on("2", day(10)));
        // Toggling today marks it, replacing yesterday's date
        assert!(store.toggle_medicine_taken_on("2", day(10)).await.unwrap());
        assert_eq!(store.state().taken.get("2"), Some(&day(10)));
    }

    #[tokio::test]
    async fn test_toggle_unknown_medicine_fails() {
        let (mut store, _) = logged_in().await;
        assert!(store.toggle_medicine_taken_on("99", day(10)).await.is_err());
    }

    #[tokio::test]
    async fn test_hydration_clamps_at_zero() {
        let (mut store, _) = logged_in().await;
        assert_eq!(store.adjust_hydration_on(day(10), -1).await.unwrap(), 0);
        assert_eq!(store.adjust_hydration_on(day(10), 1).await.unwrap(), 1);
        assert_eq!(store.adjust_hydration_on(day(10), 1).await.unwrap(), 2);
        assert_eq!(store.adjust_hydration_on(day(10), -5).await.unwrap(), 0);
        assert_eq!(store.adjust_hydration_on(day(11), 1).await.unwrap(), 1);
        assert_eq!(store.state().hydration_on(day(10)), 0);
    }

    #[tokio::test]
    async fn test_health_log_sorted_descending() {
        let (mut store, _) = logged_in().await;
        let early = Utc.with_ymd_and_hms(2024, 6, 10, 8, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 10, 18, 0, 0).unwrap();
        let mid = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();

        store
            .add_health_log_at(Feeling::Good, None, "morning", early)
            .await
            .unwrap();
        store
            .add_health_log_at(Feeling::Tired, Some("  ".into()), "evening", late)
            .await
            .unwrap();
        store
            .add_health_log_at(Feeling::InPain, Some(" knee ".into()), "afternoon", mid)
            .await
            .unwrap();

        let log = &store.state().health_log;
        let stamps: Vec<_> = log.iter().map(|e| e.timestamp).collect();
        assert_eq!(stamps, vec![late, mid, early]);
        assert_eq!(log[0].note, None);
        assert_eq!(log[1].note.as_deref(), Some("knee"));
    }

    #[tokio::test]
    async fn test_round_trip_restores_identical_state() {
        let (mut store, storage) = logged_in().await;
        store
            .add_medicine(NewMedicine {
                name: "Aspirin".into(),
                dosage: "81 mg".into(),
                time: TimeOfDay::new(21, 15).unwrap(),
                stock: 30,
                stock_threshold: 5,
            })
            .await
            .unwrap();
        store.toggle_medicine_taken_on("3", day(10)).await.unwrap();
        store.adjust_hydration_on(day(10), 3).await.unwrap();
        store
            .set_notification_settings(NotificationSettings {
                medicine_vibration: VibrationChoice::Pulse,
                appointment_interval: LeadTime::Fifteen,
                ..Default::default()
            })
            .await
            .unwrap();
        let before = store.state().clone();

        store.logout();
        assert_eq!(store.state(), &CareState::default());

        let mut reloaded = PatientStore::new(Arc::new(storage));
        reloaded
            .login_on(PATIENT, UserRole::Caretaker, day(20))
            .await
            .unwrap();
        assert_eq!(reloaded.state(), &before);
        assert_eq!(reloaded.state().medicines.last().unwrap().name, "Aspirin");
    }

    #[tokio::test]
    async fn test_profiles_are_isolated() {
        let (mut store, storage) = logged_in().await;
        store.adjust_hydration_on(day(10), 4).await.unwrap();
        store.logout();

        let mut other = PatientStore::new(Arc::new(storage));
        other
            .login_on("MEDIMATE-BOB-5555", UserRole::Family, day(10))
            .await
            .unwrap();
        assert_eq!(other.state().hydration_on(day(10)), 0);
    }

    #[tokio::test]
    async fn test_corrupt_slice_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.put_raw(&Slice::Medicines.key_for(PATIENT), "{not json");
        storage.put_raw(&Slice::HealthLog.key_for(PATIENT), "42");

        let mut store = PatientStore::new(Arc::new(storage));
        store
            .login_on(PATIENT, UserRole::Caretaker, day(10))
            .await
            .unwrap();
        assert_eq!(store.state().medicines, seed::initial_medicines());
        assert!(store.state().health_log.is_empty());
    }

    #[tokio::test]
    async fn test_mutations_require_login() {
        let mut store = PatientStore::new(Arc::new(MemoryStorage::new()));
        assert!(store.adjust_hydration(1).await.is_err());
        assert!(store.mark_incoming_read(UserRole::Family).await.is_err());
    }

    #[tokio::test]
    async fn test_update_medicine() {
        let (mut store, _) = logged_in().await;
        let mut med = store.state().medicines[0].clone();
        med.stock = 2;
        store.update_medicine(med).await.unwrap();
        assert_eq!(store.state().medicines[0].stock, 2);

        let mut ghost = store.state().medicines[0].clone();
        ghost.id = "nope".into();
        assert!(store.update_medicine(ghost).await.is_err());
    }

    #[tokio::test]
    async fn test_mark_incoming_read() {
        let (mut store, _) = logged_in().await;
        assert_eq!(store.state().unread_count(UserRole::Caretaker), 1);
        assert_eq!(store.mark_incoming_read(UserRole::Caretaker).await.unwrap(), 1);
        assert_eq!(store.state().unread_count(UserRole::Caretaker), 0);
        assert_eq!(store.mark_incoming_read(UserRole::Caretaker).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_theme_is_unscoped() {
        let storage = MemoryStorage::new();
        let store = PatientStore::new(Arc::new(storage.clone()));
        assert_eq!(store.theme().await, Theme::Light);
        store.set_theme(Theme::Dark).await.unwrap();
        assert_eq!(storage.raw("theme").as_deref(), Some("\"dark\""));
        assert_eq!(store.theme().await, Theme::Dark);
    }

    #[tokio::test]
    async fn test_added_ids_are_unique() {
        let (mut store, _) = logged_in().await;
        let new = || NewAppointment {
            doctor: "Dr. Rao".into(),
            clinic: "Eye Clinic".into(),
            date: day(12),
            time: TimeOfDay::new(9, 0).unwrap(),
        };
        let a = store.add_appointment(new()).await.unwrap();
        let b = store.add_appointment(new()).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_send_message_appends_unread() {
        let (mut store, storage) = logged_in().await;
        let sent = store
            .send_message("  Taking her to the clinic at 4  ", UserRole::Caretaker)
            .await
            .unwrap();
        assert_eq!(sent.text, "Taking her to the clinic at 4");
        assert!(!sent.read);
        assert_eq!(store.state().messages.last(), Some(&sent));

        let raw = storage.raw(&Slice::Messages.key_for(PATIENT)).unwrap();
        assert!(raw.contains("Taking her to the clinic at 4"));

        assert!(store.send_message("   ", UserRole::Caretaker).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_unchanged() {
        let storage = Arc::new(FlakyStorage::default());
        let mut store = PatientStore::new(storage.clone());
        store
            .login_on(PATIENT, UserRole::Caretaker, day(10))
            .await
            .unwrap();
        let before = store.state().clone();

        storage
            .fail_writes
            .store(true, std::sync::atomic::Ordering::SeqCst);
        assert!(store.toggle_medicine_taken_on("1", day(10)).await.is_err());
        assert!(store.adjust_hydration_on(day(10), 2).await.is_err());
        assert!(store.mark_incoming_read(UserRole::Caretaker).await.is_err());
        assert!(store
            .add_health_log(Feeling::Good, None, "How are you?")
            .await
            .is_err());
        assert_eq!(store.state(), &before);

        storage
            .fail_writes
            .store(false, std::sync::atomic::Ordering::SeqCst);
        assert!(store.toggle_medicine_taken_on("1", day(10)).await.unwrap());
        assert!(store.state().is_taken_on("1", day(10)));
    }
}
