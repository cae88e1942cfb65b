//! # Core Module
//!
//! Core domain types, configuration, and time helpers for MediMate.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Add time module with TimeOfDay
//! - 1.1.0: Add models module with care domain types
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod models;
pub mod time;

// Re-export commonly used items
pub use config::{AiProvider, Config};
pub use models::{
    Appointment, Feeling, HealthLogEntry, HydrationMap, LeadTime, Medicine, Message,
    NewAppointment, NewMedicine, NotificationPermission, NotificationSettings, SoundChoice,
    TakenMap, Theme, UserRole, VibrationChoice,
};
pub use time::{local_now, local_today, TimeOfDay};
