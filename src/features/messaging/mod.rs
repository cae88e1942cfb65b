//! # Messaging Feature
//!
//! Caretaker/family chat thread. The other party is simulated locally: sent
//! messages get a read receipt and a typing indicator on timers.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: MessagingBackend trait so the simulator can be replaced
//! - 1.0.0: Initial release

pub mod simulator;

pub use simulator::{MessagingBackend, SimulatedCounterpart, SimulationTimings};
