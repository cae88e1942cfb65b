//! # Emergency Feature
//!
//! Compose and dispatch an emergency alert. There is no real delivery
//! channel: dispatch logs the alert and hands back a receipt. Calling for
//! help means dialling the emergency number.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.1.0
//! - **Toggleable**: false

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, Utc};
use log::warn;
use std::fmt;
use uuid::Uuid;

pub const EMERGENCY_NUMBER: &str = "112";

pub fn emergency_dial_uri() -> String {
    format!("tel:{EMERGENCY_NUMBER}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmergencyReason {
    PanicAttack,
    ChestPain,
    BreathingTrouble,
    Fall,
    Accident,
    AllergicReaction,
    MedicationIssue,
    ElderlyHelp,
    HeartAttack,
    Seizure,
    Unconscious,
    Bleeding,
    Overdose,
    Injury,
}

impl EmergencyReason {
    pub const ALL: [EmergencyReason; 14] = [
        EmergencyReason::PanicAttack,
        EmergencyReason::ChestPain,
        EmergencyReason::BreathingTrouble,
        EmergencyReason::Fall,
        EmergencyReason::Accident,
        EmergencyReason::AllergicReaction,
        EmergencyReason::MedicationIssue,
        EmergencyReason::ElderlyHelp,
        EmergencyReason::HeartAttack,
        EmergencyReason::Seizure,
        EmergencyReason::Unconscious,
        EmergencyReason::Bleeding,
        EmergencyReason::Overdose,
        EmergencyReason::Injury,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EmergencyReason::PanicAttack => "Panic attack",
            EmergencyReason::ChestPain => "Chest pain",
            EmergencyReason::BreathingTrouble => "Trouble breathing",
            EmergencyReason::Fall => "Fall",
            EmergencyReason::Accident => "Accident",
            EmergencyReason::AllergicReaction => "Allergic reaction",
            EmergencyReason::MedicationIssue => "Medication issue",
            EmergencyReason::ElderlyHelp => "Elderly person needs help",
            EmergencyReason::HeartAttack => "Heart attack",
            EmergencyReason::Seizure => "Seizure",
            EmergencyReason::Unconscious => "Unconscious person",
            EmergencyReason::Bleeding => "Severe bleeding",
            EmergencyReason::Overdose => "Overdose",
            EmergencyReason::Injury => "Injury",
        }
    }

    /// Pick by 1-based menu position
    pub fn from_index(index: usize) -> Option<Self> {
        index.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }
}

impl fmt::Display for EmergencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for EmergencyReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(index) = s.trim().parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| anyhow!("Reason number must be 1-{}", Self::ALL.len()));
        }
        let wanted: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|reason| {
                let variant = format!("{reason:?}").to_lowercase();
                let label: String = reason
                    .label()
                    .chars()
                    .filter(|c| c.is_ascii_alphanumeric())
                    .collect::<String>()
                    .to_lowercase();
                variant == wanted || label == wanted
            })
            .ok_or_else(|| anyhow!("Unknown emergency reason: {}", s.trim()))
    }
}

/// An alert being composed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyAlert {
    pub reason: EmergencyReason,
    pub message: String,
    pub audio_attached: bool,
    pub photo_attached: bool,
}

impl EmergencyAlert {
    /// Start from a reason; the message is pre-filled with it
    pub fn compose(reason: EmergencyReason) -> Self {
        EmergencyAlert {
            reason,
            message: format!("{}. ", reason.label()),
            audio_attached: false,
            photo_attached: false,
        }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        let details = details.trim();
        if !details.is_empty() {
            self.message.push_str(details);
        }
        self
    }

    pub fn with_audio(mut self) -> Self {
        self.audio_attached = true;
        self
    }

    pub fn with_photo(mut self) -> Self {
        self.photo_attached = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertReceipt {
    pub alert_id: Uuid,
    pub sent_at: DateTime<Utc>,
}

pub fn dispatch(alert: &EmergencyAlert) -> Result<AlertReceipt> {
    if alert.message.trim().is_empty() {
        bail!("Emergency message is empty");
    }
    let receipt = AlertReceipt {
        alert_id: Uuid::new_v4(),
        sent_at: Utc::now(),
    };
    warn!("--- EMERGENCY ALERT SENT ({}) ---", receipt.alert_id);
    warn!("Reason/Message: {}", alert.message.trim_end());
    warn!("Audio attached: {}", alert.audio_attached);
    warn!("Photo attached: {}", alert.photo_attached);
    Ok(receipt)
}
