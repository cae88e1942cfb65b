//! Care domain types shared by every feature
//!
//! All entities serialize with camelCase keys so a stored slice reads the same
//! regardless of which front end wrote it.
//!
//! - **Version**: 1.4.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.4.0: NotificationPermission moved here from reminders
//! - 1.3.0: SoundChoice carried on notifications
//! - 1.2.0: Typed LeadTime (15/30/60) replaces raw minutes
//! - 1.1.0: HealthLogEntry with check-in prompt
//! - 1.0.0: Initial release

use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::time::TimeOfDay;

/// Whether the platform lets us raise notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    Granted,
    Denied,
    /// Not yet asked
    Default,
}

impl std::str::FromStr for NotificationPermission {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "granted" => Ok(NotificationPermission::Granted),
            "denied" => Ok(NotificationPermission::Denied),
            "default" | "prompt" => Ok(NotificationPermission::Default),
            other => Err(anyhow!("Unknown NOTIFICATION_PERMISSION: {}", other)),
        }
    }
}

/// Who is using the app (and who authored a message)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Caretaker,
    Family,
}

impl UserRole {
    /// The other party in the conversation
    pub fn counterpart(&self) -> UserRole {
        match self {
            UserRole::Caretaker => UserRole::Family,
            UserRole::Family => UserRole::Caretaker,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Caretaker => "caretaker",
            UserRole::Family => "family",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "caretaker" => Ok(UserRole::Caretaker),
            "family" => Ok(UserRole::Family),
            other => Err(anyhow!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medicine {
    pub id: String,
    pub name: String,
    pub dosage: String,
    pub time: TimeOfDay,
    pub stock: u32,
    pub stock_threshold: u32,
}

impl Medicine {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.stock_threshold
    }
}

/// Fields a caretaker supplies when adding a medicine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicine {
    pub name: String,
    pub dosage: String,
    pub time: TimeOfDay,
    pub stock: u32,
    pub stock_threshold: u32,
}

impl NewMedicine {
    pub fn with_id(self, id: String) -> Medicine {
        Medicine {
            id,
            name: self.name,
            dosage: self.dosage,
            time: self.time,
            stock: self.stock,
            stock_threshold: self.stock_threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub doctor: String,
    pub clinic: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub doctor: String,
    pub clinic: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
}

impl NewAppointment {
    pub fn with_id(self, id: String) -> Appointment {
        Appointment {
            id,
            doctor: self.doctor,
            clinic: self.clinic,
            date: self.date,
            time: self.time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Creation timestamp, doubles as ordering key
    pub id: String,
    pub text: String,
    pub sender: UserRole,
    /// Display time, e.g. "10:05 AM"
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feeling {
    Good,
    Tired,
    #[serde(rename = "In Pain")]
    InPain,
    Energetic,
}

impl Feeling {
    pub const ALL: [Feeling; 4] = [
        Feeling::Good,
        Feeling::Tired,
        Feeling::InPain,
        Feeling::Energetic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Feeling::Good => "Good",
            Feeling::Tired => "Tired",
            Feeling::InPain => "In Pain",
            Feeling::Energetic => "Energetic",
        }
    }
}

impl fmt::Display for Feeling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Feeling {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "good" => Ok(Feeling::Good),
            "tired" => Ok(Feeling::Tired),
            "inpain" | "pain" => Ok(Feeling::InPain),
            "energetic" => Ok(Feeling::Energetic),
            _ => Err(anyhow!("Unknown feeling: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub feeling: Feeling,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoundChoice {
    #[default]
    Default,
    Chime,
    Alert,
}

impl std::str::FromStr for SoundChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(SoundChoice::Default),
            "chime" => Ok(SoundChoice::Chime),
            "alert" => Ok(SoundChoice::Alert),
            other => Err(anyhow!("Unknown sound: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VibrationChoice {
    #[default]
    Default,
    Pulse,
    None,
}

impl VibrationChoice {
    /// Vibration pattern in milliseconds (on, off, on, ...)
    pub fn pattern(&self) -> &'static [u32] {
        match self {
            VibrationChoice::Default => &[100],
            VibrationChoice::Pulse => &[200, 100, 200],
            VibrationChoice::None => &[],
        }
    }
}

impl std::str::FromStr for VibrationChoice {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(VibrationChoice::Default),
            "pulse" => Ok(VibrationChoice::Pulse),
            "none" => Ok(VibrationChoice::None),
            other => Err(anyhow!("Unknown vibration: {}", other)),
        }
    }
}

/// Appointment reminder lead time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum LeadTime {
    Fifteen,
    #[default]
    Thirty,
    Sixty,
}

impl LeadTime {
    pub fn minutes(&self) -> u32 {
        match self {
            LeadTime::Fifteen => 15,
            LeadTime::Thirty => 30,
            LeadTime::Sixty => 60,
        }
    }
}

impl TryFrom<u32> for LeadTime {
    type Error = String;

    fn try_from(minutes: u32) -> std::result::Result<Self, Self::Error> {
        match minutes {
            15 => Ok(LeadTime::Fifteen),
            30 => Ok(LeadTime::Thirty),
            60 => Ok(LeadTime::Sixty),
            other => Err(format!("lead time must be 15, 30 or 60 minutes, got {other}")),
        }
    }
}

impl From<LeadTime> for u32 {
    fn from(lead: LeadTime) -> u32 {
        lead.minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub medicine_sound: SoundChoice,
    pub medicine_vibration: VibrationChoice,
    pub appointment_sound: SoundChoice,
    pub appointment_vibration: VibrationChoice,
    pub appointment_interval: LeadTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(&self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Medicine id -> last date it was marked taken
pub type TakenMap = BTreeMap<String, NaiveDate>;

/// Date -> glasses of water
pub type HydrationMap = BTreeMap<NaiveDate, u32>;
