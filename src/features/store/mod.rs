//! # Patient State Store
//!
//! Per-patient application state mirrored to durable key-value storage.
//!
//! - **Version**: 1.2.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.2.0: Seeded slices are written back on first login
//! - 1.1.0: StorageBackend seam with SQLite and in-memory implementations
//! - 1.0.0: Initial release

pub mod backend;
pub mod seed;
pub mod slices;
pub mod patient_store;

pub use backend::{MemoryStorage, StorageBackend};
pub use slices::{Slice, THEME_KEY};
pub use patient_store::{CareState, PatientStore, Session, SharedStore};
