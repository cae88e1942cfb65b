// Core layer - shared types and configuration
pub mod core;

// Features layer - all feature modules
pub mod features;

// Infrastructure
pub mod database;

// Application layer
pub mod commands;

pub use core::Config;

pub use features::{
    // Assistant
    AiAssistant, HealthReadings, SugarReadingType, TextGenerator,
    // Dashboard
    DashboardView,
    // Emergency
    EmergencyAlert, EmergencyReason,
    // Messaging
    MessagingBackend, SimulatedCounterpart,
    // Reminders
    LogNotifier, Notifier, ReminderScheduler,
    // Store
    PatientStore, SharedStore, StorageBackend,
};

pub use commands::{CommandContext, CommandRegistry};
