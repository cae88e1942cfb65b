//! # Dashboard Feature
//!
//! Today's overview for the logged-in patient: the next dose, upcoming and
//! low-stock medicines, appointments, hydration progress and the check-in
//! prompt.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Unread message count for the viewer's role
//! - 1.0.0: Initial release

use chrono::{DateTime, Duration, TimeZone};

use crate::core::{Appointment, HealthLogEntry, Medicine, TimeOfDay, UserRole};
use crate::features::store::CareState;

/// Glasses of water per day
pub const HYDRATION_GOAL: u32 = 8;

/// A check-in newer than this hides the check-in card
pub const RECENT_CHECK_IN_HOURS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInPrompt {
    Morning,
    Afternoon,
    Evening,
}

impl CheckInPrompt {
    pub fn for_hour(hour: u32) -> Self {
        if hour < 12 {
            CheckInPrompt::Morning
        } else if hour < 17 {
            CheckInPrompt::Afternoon
        } else {
            CheckInPrompt::Evening
        }
    }

    pub fn text(&self) -> &'static str {
        match self {
            CheckInPrompt::Morning => "Good morning! How are you feeling today?",
            CheckInPrompt::Afternoon => "How is your afternoon going?",
            CheckInPrompt::Evening => "How are you feeling this evening?",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MedicationStatus {
    pub medicine: Medicine,
    pub taken_today: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HydrationStatus {
    pub count: u32,
    pub goal: u32,
}

impl HydrationStatus {
    pub fn goal_reached(&self) -> bool {
        self.count >= self.goal
    }

    pub fn remaining(&self) -> u32 {
        self.goal.saturating_sub(self.count)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub role: UserRole,
    /// Not yet taken today and not yet past, earliest first
    pub upcoming: Vec<Medicine>,
    pub medications: Vec<MedicationStatus>,
    pub low_stock: Vec<Medicine>,
    pub todays_appointments: Vec<Appointment>,
    pub todays_check_ins: Vec<HealthLogEntry>,
    pub hydration: HydrationStatus,
    pub check_in_prompt: CheckInPrompt,
    pub logged_recently: bool,
    pub unread_messages: usize,
}

impl DashboardView {
    pub fn build<Tz: TimeZone>(state: &CareState, role: UserRole, now: &DateTime<Tz>) -> Self {
        let local_now = now.naive_local();
        let today = local_now.date();
        let current = TimeOfDay::from(local_now.time());

        let mut upcoming: Vec<Medicine> = state
            .medicines
            .iter()
            .filter(|m| !state.is_taken_on(&m.id, today))
            .filter(|m| m.time >= current)
            .cloned()
            .collect();
        upcoming.sort_by_key(|m| m.time);

        let medications = state
            .medicines
            .iter()
            .map(|m| MedicationStatus {
                medicine: m.clone(),
                taken_today: state.is_taken_on(&m.id, today),
            })
            .collect();

        let low_stock = state
            .medicines
            .iter()
            .filter(|m| m.is_low_stock())
            .cloned()
            .collect();

        let mut todays_appointments: Vec<Appointment> = state
            .appointments
            .iter()
            .filter(|a| a.date == today)
            .cloned()
            .collect();
        todays_appointments.sort_by_key(|a| a.time);

        let zone = now.timezone();
        let todays_check_ins = state
            .health_log
            .iter()
            .filter(|e| e.timestamp.with_timezone(&zone).date_naive() == today)
            .cloned()
            .collect();

        // Log is kept newest-first
        let logged_recently = state.health_log.first().is_some_and(|latest| {
            now.clone().signed_duration_since(latest.timestamp.with_timezone(&zone))
                < Duration::hours(RECENT_CHECK_IN_HOURS)
        });

        DashboardView {
            role,
            upcoming,
            medications,
            low_stock,
            todays_appointments,
            todays_check_ins,
            hydration: HydrationStatus {
                count: state.hydration_on(today),
                goal: HYDRATION_GOAL,
            },
            check_in_prompt: CheckInPrompt::for_hour(current.hour()),
            logged_recently,
            unread_messages: state.unread_count(role),
        }
    }

    pub fn next_medicine(&self) -> Option<&Medicine> {
        self.upcoming.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Feeling;
    use crate::features::store::seed;
    use chrono::{NaiveDate, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
    }

    fn seeded() -> CareState {
        CareState {
            medicines: seed::initial_medicines(),
            appointments: seed::initial_appointments(today()),
            messages: seed::initial_messages(),
            ..Default::default()
        }
    }

    fn check_in(at: DateTime<Utc>) -> HealthLogEntry {
        HealthLogEntry {
            id: at.to_rfc3339(),
            timestamp: at,
            feeling: Feeling::Good,
            note: None,
            prompt: CheckInPrompt::Morning.text().to_string(),
        }
    }

    #[test]
    fn test_upcoming_sorted_and_includes_current_minute() {
        let view = DashboardView::build(&seeded(), UserRole::Caretaker, &at(8, 0));
        let names: Vec<_> = view.upcoming.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Metformin", "Amlodipine", "Vitamin D", "Atorvastatin"]);
        assert_eq!(view.next_medicine().map(|m| m.id.as_str()), Some("1"));
    }

    #[test]
    fn test_taken_medicine_leaves_upcoming() {
        let mut state = seeded();
        state.taken.insert("1".into(), today());
        let view = DashboardView::build(&state, UserRole::Caretaker, &at(7, 0));

        assert!(view.upcoming.iter().all(|m| m.id != "1"));
        let first = view.medications.iter().find(|s| s.medicine.id == "1").unwrap();
        assert!(first.taken_today);
    }

    #[test]
    fn test_taken_yesterday_still_upcoming() {
        let mut state = seeded();
        state.taken.insert("1".into(), today().pred_opt().unwrap());
        let view = DashboardView::build(&state, UserRole::Caretaker, &at(7, 0));
        assert_eq!(view.upcoming[0].id, "1");
        assert!(!view.medications[0].taken_today);
    }

    #[test]
    fn test_low_stock_and_appointments() {
        let view = DashboardView::build(&seeded(), UserRole::Family, &at(9, 0));
        let low: Vec<_> = view.low_stock.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(low, vec!["Atorvastatin"]);
        assert_eq!(view.todays_appointments.len(), 1);

        let tomorrow = Utc.with_ymd_and_hms(2024, 6, 11, 9, 0, 0).unwrap();
        let view = DashboardView::build(&seeded(), UserRole::Family, &tomorrow);
        assert!(view.todays_appointments.is_empty());
    }

    #[test]
    fn test_hydration_goal() {
        let mut state = seeded();
        state.hydration.insert(today(), 5);
        let view = DashboardView::build(&state, UserRole::Caretaker, &at(12, 0));
        assert_eq!(view.hydration.remaining(), 3);
        assert!(!view.hydration.goal_reached());

        state.hydration.insert(today(), 9);
        let view = DashboardView::build(&state, UserRole::Caretaker, &at(12, 0));
        assert_eq!(view.hydration.remaining(), 0);
        assert!(view.hydration.goal_reached());
    }

    #[test]
    fn test_check_in_prompt_by_hour() {
        assert_eq!(CheckInPrompt::for_hour(0), CheckInPrompt::Morning);
        assert_eq!(CheckInPrompt::for_hour(11), CheckInPrompt::Morning);
        assert_eq!(CheckInPrompt::for_hour(12), CheckInPrompt::Afternoon);
        assert_eq!(CheckInPrompt::for_hour(16), CheckInPrompt::Afternoon);
        assert_eq!(CheckInPrompt::for_hour(17), CheckInPrompt::Evening);
    }

    #[test]
    fn test_logged_recently_window() {
        let mut state = seeded();
        state.health_log = vec![check_in(at(9, 0))];

        let view = DashboardView::build(&state, UserRole::Caretaker, &at(11, 59));
        assert!(view.logged_recently);
        assert_eq!(view.todays_check_ins.len(), 1);

        let view = DashboardView::build(&state, UserRole::Caretaker, &at(12, 0));
        assert!(!view.logged_recently);
    }

    #[test]
    fn test_unread_is_per_role() {
        let caretaker = DashboardView::build(&seeded(), UserRole::Caretaker, &at(9, 0));
        let family = DashboardView::build(&seeded(), UserRole::Family, &at(9, 0));
        assert_eq!(caretaker.unread_messages, 1);
        assert_eq!(family.unread_messages, 0);
    }
}
