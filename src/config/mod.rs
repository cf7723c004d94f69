//! Configuration management module
//!
//! This module handles loading, saving, and observing application settings.
//! Settings are stored in %APPDATA%\Pausa\config.json with atomic writes
//! to prevent corruption, and every field change is independently observable
//! through `SettingsEvent` notifications.

pub mod controller;
pub mod manager;
pub mod models;

pub use controller::{SettingsController, SettingsEvent};
pub use manager::ConfigManager;
pub use models::{AppConfig, Durations, Preferences, SavedSession, UpdateState, WindowState};
