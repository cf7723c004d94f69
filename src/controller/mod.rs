//! Application logic controller module
//!
//! The application controller is the central coordinator between the timer,
//! the settings store, and the update checker.
//!
//! # Event Flow
//!
//! ```text
//! TimerController    ─ TimerEvent ──┐
//! SettingsController ─ SettingsEvent ┼→ AppController ─ AppEvent → tray manager
//! UpdateController   ─ UpdateEvent ─┘
//! ```
//!
//! # Break scheduling
//!
//! The timer itself knows nothing about configured durations; the controller
//! compares the timer counters against the settings on every change:
//!
//! 1. `elapsed_work_period` reaching `break_interval` (plus accumulated
//!    postponement) raises a break request, once.
//! 2. `postpone_break()` pushes the request out by `postpone_time`.
//! 3. During a break, `elapsed_break_duration` reaching `break_duration`
//!    ends the break, clears the per-period counters, and resumes work.
//! 4. `elapsed_work_time` reaching `work_time` raises a work-finished
//!    notification, once per session.

pub mod app_controller;

pub use app_controller::{AppController, AppEvent, State};
