//! Tray manager implementation
//!
//! Owns the tray icon and its context menu, keeps the tooltip and the
//! "Take a break!" action in sync with the timer and settings, and handles
//! the hide-to-tray window transitions.

use crate::config::SettingsController;
use crate::controller::{AppController, AppEvent, State};
use crate::timer::{PeriodType, TimerController};
use crate::utils::format_time;
use std::sync::Arc;
use tracing::{info, warn};

#[cfg(windows)]
use crate::error::{PausaError, Result};
#[cfg(windows)]
use tray_icon::{
    Icon, TrayIconBuilder,
    menu::{Menu, MenuId, MenuItem, PredefinedMenuItem},
};

/// Main-window seam the tray manager drives
///
/// The application has no hard dependency on a GUI toolkit; whatever renders
/// the main window implements this trait.
pub trait WindowHandle: Send + Sync {
    /// Show and activate the window
    fn show(&self);
    /// Hide the window
    fn hide(&self);
    /// Whether the window is currently visible
    fn is_visible(&self) -> bool;
    /// Present the break dialog
    fn show_break_dialog(&self);
    /// Present the settings dialog
    fn show_settings_dialog(&self);
    /// Present the about dialog
    fn show_about_dialog(&self);
}

/// How the user asked to quit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitRequest {
    /// Persist the session before quitting
    Save,
    /// Quit and discard the session
    Discard,
}

/// Whether this desktop can show a tray icon
///
/// Windows always can. On Linux, GNOME is treated as unavailable (no
/// first-class tray support); other desktops count as available. Everything
/// else has no tray integration in this application.
pub fn desktop_tray_available() -> bool {
    if cfg!(target_os = "windows") {
        return true;
    }
    if cfg!(target_os = "linux") {
        let desktop = std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default();
        return !is_gnome_desktop(&desktop);
    }
    false
}

/// GNOME check against the `XDG_CURRENT_DESKTOP` value
fn is_gnome_desktop(desktop: &str) -> bool {
    desktop.to_ascii_lowercase().starts_with("gnome")
}

/// Tooltip summarizing the progress toward the next break and the work day
#[cfg_attr(not(windows), allow(dead_code))]
fn tooltip_text(
    elapsed_work_period: u32,
    break_interval: u32,
    elapsed_work_time: u32,
    work_time: u32,
) -> String {
    format!(
        "NEXT BREAK:\n{} / {}\n\nWORK TIME:\n{} / {}",
        format_time(elapsed_work_period),
        format_time(break_interval),
        format_time(elapsed_work_time),
        format_time(work_time),
    )
}

/// The break action is offered only while actually working
#[cfg_attr(not(windows), allow(dead_code))]
fn break_action_enabled(state: State, period: PeriodType) -> bool {
    state == State::Working && period == PeriodType::Work
}

/// Parse a `#RRGGBB` color, falling back to the default accent
#[cfg_attr(not(windows), allow(dead_code))]
fn parse_color(hex: &str) -> (u8, u8, u8) {
    let fallback = (0x19, 0x88, 0x6F);
    let Some(digits) = hex.strip_prefix('#') else {
        return fallback;
    };
    if digits.len() != 6 {
        return fallback;
    }
    match (
        u8::from_str_radix(&digits[0..2], 16),
        u8::from_str_radix(&digits[2..4], 16),
        u8::from_str_radix(&digits[4..6], 16),
    ) {
        (Ok(r), Ok(g), Ok(b)) => (r, g, b),
        _ => fallback,
    }
}

/// System tray icon with context menu (Windows)
#[cfg(windows)]
pub struct TrayManager {
    /// The tray icon, kept alive for the application lifetime
    tray: tray_icon::TrayIcon,
    open_id: MenuId,
    break_item: MenuItem,
    settings_id: MenuId,
    about_id: MenuId,
    save_quit_id: MenuId,
    quit_id: MenuId,
    timer: Arc<TimerController>,
    settings: Arc<SettingsController>,
    controller: Arc<AppController>,
    window: Arc<dyn WindowHandle>,
}

#[cfg(windows)]
impl TrayManager {
    /// Create the tray icon and menu and publish tray availability
    pub fn new(
        timer: Arc<TimerController>,
        settings: Arc<SettingsController>,
        controller: Arc<AppController>,
        window: Arc<dyn WindowHandle>,
    ) -> Result<Self> {
        info!("Creating system tray icon");

        if let Err(e) = settings.set_tray_available(desktop_tray_available()) {
            warn!("Failed to persist tray availability: {}", e);
        }

        let menu = Menu::new();

        let open_item = MenuItem::new("Pausa", true, None);
        let break_item = MenuItem::new("Take a break!", false, None);
        let settings_item = MenuItem::new("Settings", true, None);
        let about_item = MenuItem::new("About", true, None);
        let save_quit_item = MenuItem::new("Save && Quit", true, None);
        let quit_item = MenuItem::new("Quit", true, None);

        menu.append(&open_item).map_err(wrap_menu_error)?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(wrap_menu_error)?;
        menu.append(&break_item).map_err(wrap_menu_error)?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(wrap_menu_error)?;
        menu.append(&settings_item).map_err(wrap_menu_error)?;
        menu.append(&about_item).map_err(wrap_menu_error)?;
        menu.append(&PredefinedMenuItem::separator())
            .map_err(wrap_menu_error)?;
        menu.append(&save_quit_item).map_err(wrap_menu_error)?;
        menu.append(&quit_item).map_err(wrap_menu_error)?;

        let icon = create_accent_icon(parse_color(&settings.application_color()))?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .with_tooltip("Pausa")
            .build()
            .map_err(|e| PausaError::TrayError(Box::new(e)))?;

        let manager = Self {
            tray,
            open_id: open_item.id().clone(),
            break_item: break_item.clone(),
            settings_id: settings_item.id().clone(),
            about_id: about_item.id().clone(),
            save_quit_id: save_quit_item.id().clone(),
            quit_id: quit_item.id().clone(),
            timer,
            settings,
            controller,
            window,
        };

        manager.update_tooltip();
        manager.check_break_availability();

        info!("System tray icon created");
        Ok(manager)
    }

    /// Hide the window right after startup when configured to
    pub fn check_init_state(&self) {
        if self.settings.auto_hide() {
            self.window.hide();
        }
    }

    /// Dispatch a context-menu click; quit requests bubble to the caller
    pub fn handle_menu_event(&self, id: &MenuId) -> Option<QuitRequest> {
        if *id == self.open_id {
            self.window.show();
        } else if *id == *self.break_item.id() {
            self.controller.start_break();
            self.window.show_break_dialog();
        } else if *id == self.settings_id {
            self.window.show_settings_dialog();
        } else if *id == self.about_id {
            self.window.show_about_dialog();
        } else if *id == self.save_quit_id {
            return Some(QuitRequest::Save);
        } else if *id == self.quit_id {
            return Some(QuitRequest::Discard);
        }
        None
    }

    /// React to a controller event
    pub fn on_app_event(&self, event: &AppEvent) {
        match event {
            AppEvent::Refresh => self.update_tooltip(),
            AppEvent::StateChanged(_) | AppEvent::PeriodChanged(_) => {
                self.check_break_availability();
                self.update_tooltip();
            }
            AppEvent::BreakRequested => self.window.show_break_dialog(),
            _ => {}
        }
    }

    /// Toggle the main window, as on a tray icon click
    pub fn change_visibility(&self) {
        if self.window.is_visible() {
            self.window.hide();
        } else {
            self.window.show();
        }
    }

    /// Handle the main window being closed
    ///
    /// With hide-on-close enabled the window goes to the tray (with the
    /// one-time information dialog); otherwise the user is asked whether to
    /// save the running session, and a quit request is returned.
    pub fn on_window_closed(&self) -> Option<QuitRequest> {
        if self.settings.hide_on_close() {
            self.show_information_dialog();
            self.window.hide();
            return None;
        }
        if self.controller.state() == State::Off {
            return Some(QuitRequest::Discard);
        }
        let answer = rfd::MessageDialog::new()
            .set_title("Save")
            .set_description("Do you want to save your state?")
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        if answer == rfd::MessageDialogResult::Yes {
            Some(QuitRequest::Save)
        } else {
            Some(QuitRequest::Discard)
        }
    }

    /// Handle the main window being minimized: hide to the tray
    pub fn on_window_minimized(&self) {
        self.show_information_dialog();
        self.window.hide();
    }

    fn show_information_dialog(&self) {
        if !self.settings.show_tray_info() {
            return;
        }
        const DONT_SHOW: &str = "Don't show this any more";
        let result = rfd::MessageDialog::new()
            .set_title("Please note")
            .set_description(
                "Application will be hidden into the system tray.\n\
                 If you want to open it, just click on an icon or use a context menu option.\n\
                 Break notification will continue to be displayed normally.",
            )
            .set_buttons(rfd::MessageButtons::OkCancelCustom(
                "OK".to_string(),
                DONT_SHOW.to_string(),
            ))
            .show();
        if let rfd::MessageDialogResult::Custom(label) = result
            && label == DONT_SHOW
            && let Err(e) = self.settings.set_show_tray_info(false)
        {
            warn!("Failed to persist tray info preference: {}", e);
        }
    }

    fn update_tooltip(&self) {
        let text = tooltip_text(
            self.timer.elapsed_work_period(),
            self.settings.break_interval(),
            self.timer.elapsed_work_time(),
            self.settings.work_time(),
        );
        if let Err(e) = self.tray.set_tooltip(Some(text)) {
            warn!("Failed to update tray tooltip: {}", e);
        }
    }

    fn check_break_availability(&self) {
        self.break_item.set_enabled(break_action_enabled(
            self.controller.state(),
            self.timer.active_period_type(),
        ));
    }
}

#[cfg(windows)]
fn wrap_menu_error(e: tray_icon::menu::Error) -> PausaError {
    PausaError::TrayError(Box::new(e))
}

/// Build a 32x32 accent-colored square icon with a darker border
#[cfg(windows)]
fn create_accent_icon((r, g, b): (u8, u8, u8)) -> Result<Icon> {
    const ICON_SIZE: usize = 32;
    let mut rgba = vec![0u8; ICON_SIZE * ICON_SIZE * 4];

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            let idx = (y * ICON_SIZE + x) * 4;
            let on_border = x == 0 || x == ICON_SIZE - 1 || y == 0 || y == ICON_SIZE - 1;
            let (pr, pg, pb) = if on_border {
                (r / 2, g / 2, b / 2)
            } else {
                (r, g, b)
            };
            rgba[idx] = pr;
            rgba[idx + 1] = pg;
            rgba[idx + 2] = pb;
            rgba[idx + 3] = 255;
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "ICON_SIZE is a small compile-time constant"
    )]
    let side = ICON_SIZE as u32;
    Icon::from_rgba(rgba, side, side).map_err(|e| PausaError::TrayError(Box::new(e)))
}

/// Stub for non-Windows platforms: no tray integration
#[cfg(not(windows))]
pub struct TrayManager;

#[cfg(not(windows))]
impl TrayManager {
    /// Publish tray availability and return the stub
    pub fn new(
        _timer: Arc<TimerController>,
        settings: Arc<SettingsController>,
        _controller: Arc<AppController>,
        _window: Arc<dyn WindowHandle>,
    ) -> crate::error::Result<Self> {
        if let Err(e) = settings.set_tray_available(false) {
            warn!("Failed to persist tray availability: {}", e);
        }
        info!(
            "Tray integration not built for this platform (desktop reports tray: {})",
            desktop_tray_available()
        );
        Ok(Self)
    }

    /// No-op off Windows
    pub fn check_init_state(&self) {}

    /// No-op off Windows
    pub fn on_app_event(&self, _event: &AppEvent) {}

    /// No tray: closing the window always quits, saving the session
    pub fn on_window_closed(&self) -> Option<QuitRequest> {
        Some(QuitRequest::Save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_formats_all_counters() {
        let text = tooltip_text(90, 45 * 60, 3700, 8 * 3600);
        assert_eq!(
            text,
            "NEXT BREAK:\n0:01:30 / 0:45:00\n\nWORK TIME:\n1:01:40 / 8:00:00"
        );
    }

    #[test]
    fn test_break_action_only_while_working() {
        assert!(break_action_enabled(State::Working, PeriodType::Work));
        assert!(!break_action_enabled(State::Working, PeriodType::Break));
        assert!(!break_action_enabled(State::Break, PeriodType::Break));
        assert!(!break_action_enabled(State::Off, PeriodType::Work));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#19886F"), (0x19, 0x88, 0x6F));
        assert_eq!(parse_color("#000000"), (0, 0, 0));
        // malformed values fall back to the default accent
        assert_eq!(parse_color("19886F"), (0x19, 0x88, 0x6F));
        assert_eq!(parse_color("#zzzzzz"), (0x19, 0x88, 0x6F));
        assert_eq!(parse_color("#fff"), (0x19, 0x88, 0x6F));
    }

    #[test]
    fn test_gnome_detection_is_case_insensitive() {
        assert!(is_gnome_desktop("GNOME"));
        assert!(is_gnome_desktop("gnome"));
        assert!(is_gnome_desktop("GNOME-Flashback:GNOME"));
        assert!(!is_gnome_desktop("KDE"));
        assert!(!is_gnome_desktop(""));
        assert!(!is_gnome_desktop("ubuntu:GNOME")); // prefix match only
    }
}
