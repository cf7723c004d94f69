//! Settings controller with per-field change notifications
//!
//! Wraps the persisted [`AppConfig`] behind compare-and-set accessors. Every
//! setter persists the configuration and emits exactly one [`SettingsEvent`]
//! for the field, and only when the value actually changed. Consumers receive
//! the events over an `mpsc` channel and react to individual fields (the tray
//! manager refreshes its tooltip on duration changes, for example).

use crate::config::manager::ConfigManager;
use crate::config::models::{AVAILABLE_COLORS, AppConfig, SavedSession};
use crate::error::Result;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use tracing::warn;

/// Change notification for a single settings field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsEvent {
    /// Break length changed (seconds)
    BreakDurationChanged(u32),
    /// Work period between breaks changed (seconds)
    BreakIntervalChanged(u32),
    /// Total daily work time changed (seconds)
    WorkTimeChanged(u32),
    /// Break postpone delay changed (seconds)
    PostponeTimeChanged(u32),
    /// Auto-start on login toggled
    AutoStartChanged(bool),
    /// Window position changed
    WindowPositionChanged(i32, i32),
    /// Window size changed
    WindowSizeChanged(u32, u32),
    /// Accent color changed
    ApplicationColorChanged(String),
    /// Tray availability probed or changed
    TrayAvailableChanged(bool),
    /// "Hidden to tray" info dialog toggled
    ShowTrayInfoChanged(bool),
    /// Hide after startup toggled
    AutoHideChanged(bool),
    /// Hide instead of quit on close toggled
    HideOnCloseChanged(bool),
    /// Acknowledged update version changed
    UpdateVersionChanged(String),
    /// Next scheduled update check changed (unix seconds, 0 = none)
    NextUpdateCheckChanged(u64),
}

/// Persisted settings with change notifications
pub struct SettingsController {
    /// Current configuration, shared with readers
    config: Arc<Mutex<AppConfig>>,
    /// Where the configuration is persisted
    config_path: PathBuf,
    /// Change event channel
    event_sender: mpsc::Sender<SettingsEvent>,
}

/// Emits one compare-and-set setter plus its getter for a scalar field.
macro_rules! settings_accessor {
    (copy $(#[$doc:meta])* $get:ident, $set:ident, $ty:ty, $($section:ident).+, $event:ident) => {
        $(#[$doc])*
        pub fn $get(&self) -> $ty {
            self.config.lock().$($section).+
        }

        /// Set the field, persist, and emit a change event when the value changed
        pub fn $set(&self, value: $ty) -> Result<()> {
            {
                let mut config = self.config.lock();
                if config.$($section).+ == value {
                    return Ok(());
                }
                config.$($section).+ = value;
            }
            self.persist()?;
            let _ = self.event_sender.send(SettingsEvent::$event(value));
            Ok(())
        }
    };
    (clone $(#[$doc:meta])* $get:ident, $set:ident, $ty:ty, $($section:ident).+, $event:ident) => {
        $(#[$doc])*
        pub fn $get(&self) -> $ty {
            self.config.lock().$($section).+.clone()
        }

        /// Set the field, persist, and emit a change event when the value changed
        pub fn $set(&self, value: $ty) -> Result<()> {
            {
                let mut config = self.config.lock();
                if config.$($section).+ == value {
                    return Ok(());
                }
                config.$($section).+ = value.clone();
            }
            self.persist()?;
            let _ = self.event_sender.send(SettingsEvent::$event(value));
            Ok(())
        }
    };
}

impl SettingsController {
    /// Create a controller over an already-loaded configuration
    pub fn new(
        config: AppConfig,
        config_path: PathBuf,
        event_sender: mpsc::Sender<SettingsEvent>,
    ) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            config_path,
            event_sender,
        }
    }

    /// Load the configuration from the default location and wrap it
    pub fn load(event_sender: mpsc::Sender<SettingsEvent>) -> Result<Self> {
        let path = ConfigManager::get_config_path();
        let config = ConfigManager::load_from(&path)?;
        Ok(Self::new(config, path, event_sender))
    }

    /// Colors the user may pick from, first entry is the default
    pub fn available_colors() -> &'static [&'static str] {
        &AVAILABLE_COLORS
    }

    /// Snapshot of the full configuration
    pub fn config(&self) -> AppConfig {
        self.config.lock().clone()
    }

    fn persist(&self) -> Result<()> {
        let config = self.config.lock().clone();
        ConfigManager::save_to(&self.config_path, &config)
    }

    settings_accessor!(
        copy
        /// Break length in seconds
        break_duration, set_break_duration, u32,
        durations.break_duration, BreakDurationChanged
    );

    settings_accessor!(
        copy
        /// Work period between two breaks in seconds
        break_interval, set_break_interval, u32,
        durations.break_interval, BreakIntervalChanged
    );

    settings_accessor!(
        copy
        /// Total daily work time in seconds
        work_time, set_work_time, u32,
        durations.work_time, WorkTimeChanged
    );

    settings_accessor!(
        copy
        /// Break postpone delay in seconds
        postpone_time, set_postpone_time, u32,
        durations.postpone_time, PostponeTimeChanged
    );

    settings_accessor!(
        clone
        /// Accent color
        application_color, set_application_color, String,
        preferences.application_color, ApplicationColorChanged
    );

    settings_accessor!(
        copy
        /// Whether a usable system tray was detected
        tray_available, set_tray_available, bool,
        preferences.tray_available, TrayAvailableChanged
    );

    settings_accessor!(
        copy
        /// Whether the "hidden to tray" info dialog is shown
        show_tray_info, set_show_tray_info, bool,
        preferences.show_tray_info, ShowTrayInfoChanged
    );

    settings_accessor!(
        copy
        /// Hide the window right after startup
        auto_hide, set_auto_hide, bool,
        preferences.auto_hide, AutoHideChanged
    );

    settings_accessor!(
        copy
        /// Hide to tray instead of quitting on window close
        hide_on_close, set_hide_on_close, bool,
        preferences.hide_on_close, HideOnCloseChanged
    );

    settings_accessor!(
        clone
        /// Newest update version the user acknowledged
        update_version, set_update_version, String,
        update.update_version, UpdateVersionChanged
    );

    settings_accessor!(
        copy
        /// Unix timestamp of the next scheduled update check, 0 = none
        next_update_check, set_next_update_check, u64,
        update.next_update_check, NextUpdateCheckChanged
    );

    /// Whether the application auto-starts on login
    pub fn auto_start(&self) -> bool {
        self.config.lock().preferences.auto_start
    }

    /// Toggle auto-start on login, updating the OS registration as well
    pub fn set_auto_start(&self, auto_start: bool) -> Result<()> {
        {
            let mut config = self.config.lock();
            if config.preferences.auto_start == auto_start {
                return Ok(());
            }
            config.preferences.auto_start = auto_start;
        }
        if let Err(e) = crate::utils::AutoStartManager::set_enabled(auto_start) {
            warn!("Failed to update auto-start registration: {}", e);
        }
        self.persist()?;
        let _ = self
            .event_sender
            .send(SettingsEvent::AutoStartChanged(auto_start));
        Ok(())
    }

    /// Window position
    pub fn window_position(&self) -> (i32, i32) {
        let config = self.config.lock();
        (config.window_state.x, config.window_state.y)
    }

    /// Move the persisted window position
    pub fn set_window_position(&self, x: i32, y: i32) -> Result<()> {
        {
            let mut config = self.config.lock();
            if config.window_state.x == x && config.window_state.y == y {
                return Ok(());
            }
            config.window_state.x = x;
            config.window_state.y = y;
        }
        self.persist()?;
        let _ = self
            .event_sender
            .send(SettingsEvent::WindowPositionChanged(x, y));
        Ok(())
    }

    /// Window size
    pub fn window_size(&self) -> (u32, u32) {
        let config = self.config.lock();
        (config.window_state.width, config.window_state.height)
    }

    /// Resize the persisted window geometry
    pub fn set_window_size(&self, width: u32, height: u32) -> Result<()> {
        {
            let mut config = self.config.lock();
            if config.window_state.width == width && config.window_state.height == height {
                return Ok(());
            }
            config.window_state.width = width;
            config.window_state.height = height;
        }
        self.persist()?;
        let _ = self
            .event_sender
            .send(SettingsEvent::WindowSizeChanged(width, height));
        Ok(())
    }

    /// Saved timer session from the previous run
    pub fn saved_session(&self) -> SavedSession {
        self.config.lock().session.clone()
    }

    /// Persist the current timer session for the next start
    pub fn set_saved_session(&self, session: SavedSession) -> Result<()> {
        {
            let mut config = self.config.lock();
            if config.session == session {
                return Ok(());
            }
            config.session = session;
        }
        self.persist()
    }

    /// Discard any saved timer session
    pub fn clear_saved_session(&self) -> Result<()> {
        self.set_saved_session(SavedSession::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller_with_receiver() -> (
        SettingsController,
        mpsc::Receiver<SettingsEvent>,
        tempfile::TempDir,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let (tx, rx) = mpsc::channel();
        let controller =
            SettingsController::new(AppConfig::default(), dir.path().join("config.json"), tx);
        (controller, rx, dir)
    }

    #[test]
    fn test_setter_emits_event_and_persists() {
        let (controller, rx, dir) = controller_with_receiver();

        controller.set_break_duration(300).unwrap();
        assert_eq!(controller.break_duration(), 300);
        assert_eq!(rx.try_recv().unwrap(), SettingsEvent::BreakDurationChanged(300));

        // persisted to disk
        let loaded = ConfigManager::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(loaded.durations.break_duration, 300);
    }

    #[test]
    fn test_setter_no_event_when_unchanged() {
        let (controller, rx, _dir) = controller_with_receiver();

        let current = controller.break_interval();
        controller.set_break_interval(current).unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_window_geometry_setters() {
        let (controller, rx, _dir) = controller_with_receiver();

        controller.set_window_position(10, 20).unwrap();
        controller.set_window_size(800, 600).unwrap();
        assert_eq!(controller.window_position(), (10, 20));
        assert_eq!(controller.window_size(), (800, 600));

        assert_eq!(rx.try_recv().unwrap(), SettingsEvent::WindowPositionChanged(10, 20));
        assert_eq!(rx.try_recv().unwrap(), SettingsEvent::WindowSizeChanged(800, 600));
    }

    #[test]
    fn test_update_bookkeeping() {
        let (controller, rx, _dir) = controller_with_receiver();

        controller.set_update_version("1.4".to_string()).unwrap();
        controller.set_next_update_check(1_700_000_000).unwrap();

        assert_eq!(controller.update_version(), "1.4");
        assert_eq!(controller.next_update_check(), 1_700_000_000);
        assert_eq!(
            rx.try_recv().unwrap(),
            SettingsEvent::UpdateVersionChanged("1.4".to_string())
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SettingsEvent::NextUpdateCheckChanged(1_700_000_000)
        );
    }

    #[test]
    fn test_saved_session_roundtrip() {
        let (controller, _rx, _dir) = controller_with_receiver();

        let session = SavedSession {
            elapsed_work_time: 3600,
            elapsed_work_period: 600,
        };
        controller.set_saved_session(session.clone()).unwrap();
        assert_eq!(controller.saved_session(), session);

        controller.clear_saved_session().unwrap();
        assert!(controller.saved_session().is_empty());
    }

    #[test]
    fn test_events_survive_dropped_receiver() {
        let (controller, rx, _dir) = controller_with_receiver();
        drop(rx);

        // Setters must not fail just because nobody is listening
        controller.set_auto_hide(true).unwrap();
        assert!(controller.auto_hide());
    }

    #[test]
    fn test_default_color_is_first_available() {
        let (controller, _rx, _dir) = controller_with_receiver();
        assert_eq!(
            controller.application_color(),
            SettingsController::available_colors()[0]
        );
    }
}
