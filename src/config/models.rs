//! Configuration data models
//!
//! This module defines the data structures used for persisted application
//! settings. All durations are stored in whole seconds.

use serde::{Deserialize, Serialize};

/// Accent colors the user can pick for the application, first entry is the default
pub const AVAILABLE_COLORS: [&str; 7] = [
    "#19886F", "#EC811B", "#682C90", "#C0159B", "#008000", "#0958EC", "#666666",
];

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Work/break schedule durations
    pub durations: Durations,
    /// User preferences
    pub preferences: Preferences,
    /// Window state for persistence
    pub window_state: WindowState,
    /// Update check bookkeeping
    pub update: UpdateState,
    /// Saved timer session, restored on next start
    pub session: SavedSession,
}

/// Work/break schedule durations, in seconds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Durations {
    /// Length of a single break
    pub break_duration: u32,
    /// Work period length between two breaks
    pub break_interval: u32,
    /// Total work time for a day
    pub work_time: u32,
    /// How long a postponed break is delayed
    pub postpone_time: u32,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    /// Whether to auto-start on login
    pub auto_start: bool,
    /// Accent color, one of [`AVAILABLE_COLORS`]
    pub application_color: String,
    /// Whether a system tray is usable on this desktop (probed at startup)
    pub tray_available: bool,
    /// Whether to show the "hidden to tray" information dialog
    pub show_tray_info: bool,
    /// Hide the window to the tray right after startup
    pub auto_hide: bool,
    /// Hide to the tray instead of quitting when the window is closed
    pub hide_on_close: bool,
}

/// Window state for position and size persistence
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WindowState {
    /// X position
    pub x: i32,
    /// Y position
    pub y: i32,
    /// Window width
    pub width: u32,
    /// Window height
    pub height: u32,
}

/// Update check bookkeeping
///
/// `update_version` records the newest version the user has already seen
/// (postponed or skipped). `next_update_check` is a unix timestamp in
/// seconds; zero means no check is scheduled (the version was skipped or
/// no update has been seen yet).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct UpdateState {
    /// Newest version the user acknowledged
    pub update_version: String,
    /// Unix timestamp of the next scheduled check, 0 = none
    pub next_update_check: u64,
}

/// Saved timer session counters, in seconds
///
/// Written by "Save & Quit" so the next start can resume where the user
/// left off. Both counters zero means no saved session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SavedSession {
    /// Total elapsed work time
    pub elapsed_work_time: u32,
    /// Elapsed time within the current work period
    pub elapsed_work_period: u32,
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            break_duration: 10 * 60,
            break_interval: 45 * 60,
            work_time: 8 * 60 * 60,
            postpone_time: 5 * 60,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_start: false,
            application_color: AVAILABLE_COLORS[0].to_string(),
            tray_available: false,
            show_tray_info: true,
            auto_hide: false,
            hide_on_close: true,
        }
    }
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            x: 100,
            y: 100,
            width: 450,
            height: 600,
        }
    }
}

impl SavedSession {
    /// Whether there is anything to restore
    pub fn is_empty(&self) -> bool {
        self.elapsed_work_time == 0 && self.elapsed_work_period == 0
    }
}
