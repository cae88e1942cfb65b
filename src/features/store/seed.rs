//! Seed data for a patient profile with nothing stored yet

use chrono::NaiveDate;

use crate::core::{Appointment, Medicine, Message, TimeOfDay, UserRole};

fn at(hour: u32, minute: u32) -> TimeOfDay {
    // Constant inputs below are always valid times
    TimeOfDay::new(hour, minute).unwrap_or_else(|_| TimeOfDay::from(chrono::NaiveTime::MIN))
}

fn medicine(id: &str, name: &str, dosage: &str, time: TimeOfDay, stock: u32, threshold: u32) -> Medicine {
    Medicine {
        id: id.to_string(),
        name: name.to_string(),
        dosage: dosage.to_string(),
        time,
        stock,
        stock_threshold: threshold,
    }
}

pub fn initial_medicines() -> Vec<Medicine> {
    vec![
        medicine("1", "Metformin", "1 tablet", at(8, 0), 20, 10),
        medicine("2", "Amlodipine", "1 tablet", at(8, 0), 50, 15),
        medicine("3", "Atorvastatin", "1 tablet", at(20, 0), 8, 10),
        medicine("4", "Vitamin D", "1 capsule", at(13, 0), 60, 20),
    ]
}

/// One appointment on the day the profile is first opened
pub fn initial_appointments(today: NaiveDate) -> Vec<Appointment> {
    vec![Appointment {
        id: "1".to_string(),
        doctor: "Dr. Smith".to_string(),
        clinic: "Cardiology Clinic".to_string(),
        date: today,
        time: at(11, 30),
    }]
}

pub fn initial_messages() -> Vec<Message> {
    let message = |id: &str, text: &str, sender: UserRole, timestamp: &str, read: bool| Message {
        id: id.to_string(),
        text: text.to_string(),
        sender,
        timestamp: timestamp.to_string(),
        read,
    };

    vec![
        message(
            "1",
            "Hi! Just checking in. How is mom doing today?",
            UserRole::Family,
            "10:05 AM",
            true,
        ),
        message(
            "2",
            "She is doing well. Had a good breakfast and took her morning meds on time.",
            UserRole::Caretaker,
            "10:07 AM",
            true,
        ),
        message(
            "3",
            "That's great to hear! Thanks for the update.",
            UserRole::Family,
            "10:08 AM",
            false,
        ),
    ]
}
