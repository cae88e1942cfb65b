//! Named state slices and their storage keys

use std::fmt;

/// Every independently persisted piece of per-patient state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Medicines,
    Appointments,
    Messages,
    HealthLog,
    Hydration,
    Taken,
    NotificationSettings,
}

impl Slice {
    pub const ALL: [Slice; 7] = [
        Slice::Medicines,
        Slice::Appointments,
        Slice::Messages,
        Slice::HealthLog,
        Slice::Hydration,
        Slice::Taken,
        Slice::NotificationSettings,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Slice::Medicines => "medicines",
            Slice::Appointments => "appointments",
            Slice::Messages => "messages",
            Slice::HealthLog => "healthLog",
            Slice::Hydration => "hydrationData",
            Slice::Taken => "takenMedicines",
            Slice::NotificationSettings => "notificationSettings",
        }
    }

    /// `<slice-name>_<patientId>`
    pub fn key_for(&self, patient_id: &str) -> String {
        format!("{}_{}", self.name(), patient_id)
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Device-wide theme key, not scoped to a patient
pub const THEME_KEY: &str = "theme";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_namespaced() {
        assert_eq!(
            Slice::Medicines.key_for("MEDIMATE-JANE-1234"),
            "medicines_MEDIMATE-JANE-1234"
        );
        assert_eq!(Slice::Taken.key_for("P"), "takenMedicines_P");
        assert_eq!(Slice::Hydration.key_for("P"), "hydrationData_P");
    }

    #[test]
    fn test_slice_names_unique() {
        let mut names: Vec<_> = Slice::ALL.iter().map(|s| s.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Slice::ALL.len());
    }
}
