//! # Command System
//!
//! Console command handling for the care companion.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Text commands parsed from console input, one handler per screen
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod handler;
pub mod handlers;
pub mod input;
pub mod registry;

pub use context::CommandContext;
pub use handler::CommandHandler;
pub use handlers::create_all_handlers;
pub use input::CommandInvocation;
pub use registry::CommandRegistry;
