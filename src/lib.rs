//! Pausa - break reminder living in the system tray
//!
//! Tracks elapsed work and break time on a one-second tick, reminds the user
//! to take breaks, persists preferences, and checks a version manifest URL
//! for application updates. Components communicate over event channels:
//! `TimerController` and `SettingsController` emit change events that the
//! application controller and tray manager consume, and `UpdateController`
//! performs the network check on a worker thread.

// Module declarations
pub mod config;
pub mod controller;
pub mod error;
pub mod timer;
pub mod tray;
pub mod update;
pub mod utils;

// Re-export commonly used types
pub use error::{PausaError, Result};
