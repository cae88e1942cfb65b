//! # Features
//!
//! Feature modules for MediMate. Each module carries its own version in its
//! header; `get_features()` reports them for the `version` command.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Care companion features (store, reminders, messaging, assistant, export)
//! - 1.0.0: Initial feature registry

pub mod assistant;
pub mod dashboard;
pub mod emergency;
pub mod export;
pub mod messaging;
pub mod patients;
pub mod reminders;
pub mod store;

pub use assistant::{AiAssistant, HealthReadings, SugarReadingType, TextGenerator};
pub use dashboard::DashboardView;
pub use emergency::{EmergencyAlert, EmergencyReason};
pub use messaging::{MessagingBackend, SimulatedCounterpart};
pub use patients::{generate_patient_id, validate_patient_id};
pub use reminders::{LogNotifier, Notifier, ReminderScheduler};
pub use store::{PatientStore, SharedStore, StorageBackend};

/// Version metadata for one feature module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub version: &'static str,
    pub toggleable: bool,
}

pub fn get_features() -> Vec<FeatureInfo> {
    vec![
        FeatureInfo {
            id: "store",
            name: "Patient State Store",
            version: "1.2.0",
            toggleable: false,
        },
        FeatureInfo {
            id: "reminders",
            name: "Reminders",
            version: "2.0.0",
            toggleable: true,
        },
        FeatureInfo {
            id: "messaging",
            name: "Messaging",
            version: "1.1.0",
            toggleable: false,
        },
        FeatureInfo {
            id: "assistant",
            name: "AI Assistant",
            version: "1.1.0",
            toggleable: true,
        },
        FeatureInfo {
            id: "dashboard",
            name: "Dashboard",
            version: "1.1.0",
            toggleable: false,
        },
        FeatureInfo {
            id: "emergency",
            name: "Emergency",
            version: "1.0.0",
            toggleable: false,
        },
        FeatureInfo {
            id: "export",
            name: "Data Export",
            version: "1.0.0",
            toggleable: false,
        },
        FeatureInfo {
            id: "patients",
            name: "Patient Identity",
            version: "1.0.0",
            toggleable: false,
        },
    ]
}

pub fn get_app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_feature_ids_unique() {
        let features = get_features();
        let ids: HashSet<_> = features.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), features.len());
    }

    #[test]
    fn test_app_version_matches_manifest() {
        assert_eq!(get_app_version(), "1.4.0");
    }
}
