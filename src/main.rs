//! Pausa - break reminder living in the system tray
//!
//! Counts work time on a one-second tick, reminds about breaks, and keeps
//! itself up to date via a periodic version check. The desktop integration
//! (tray icon, dialogs) is Windows-only; the core runs everywhere.

// Set Windows subsystem to hide console window
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use anyhow::{Context, Result};
use pausa::{
    config::SettingsController,
    controller::{AppController, AppEvent},
    timer::TimerController,
    tray::{QuitRequest, TrayManager, WindowHandle},
    update::{UpdateCheckResult, UpdateController},
    utils,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Version manifest polled by the update checker
const VERSION_MANIFEST_URL: &str = "https://pausa-app.github.io/updates/current.json";

/// Main entry point for the application
///
/// Initializes logging and configuration, starts the timer ticker and the
/// controller event loop on worker threads, runs the startup update check
/// when due, and then drives the tray from the main thread until the user
/// quits.
fn main() -> Result<()> {
    utils::init_logging().context("Failed to initialize logging system")?;

    info!("Pausa v{} starting...", env!("CARGO_PKG_VERSION"));

    let (settings_tx, settings_rx) = mpsc::channel();
    let settings = Arc::new(
        SettingsController::load(settings_tx).context("Failed to load application configuration")?,
    );
    info!(
        "Configuration loaded (break interval {}s, break duration {}s)",
        settings.break_interval(),
        settings.break_duration()
    );

    let (timer_tx, timer_rx) = mpsc::channel();
    let timer = Arc::new(TimerController::new(timer_tx));

    info!("Starting timer ticker thread");
    let _ticker_handle = timer.spawn_ticker();

    let (update_tx, update_rx) = mpsc::channel();
    let updates = Arc::new(
        UpdateController::new(VERSION_MANIFEST_URL, Arc::clone(&settings), update_tx)
            .context("Failed to create update checker")?,
    );

    let (app_tx, app_rx) = mpsc::channel();
    let controller = Arc::new(AppController::new(
        Arc::clone(&timer),
        Arc::clone(&settings),
        timer_rx,
        settings_rx,
        update_rx,
        app_tx,
    ));

    info!("Starting controller event loop thread");
    let _controller_handle = {
        let controller = Arc::clone(&controller);
        std::thread::spawn(move || controller.run())
    };

    // Resume a saved session if one exists, otherwise start fresh
    let restored = controller.restore_saved_session();
    controller.start(!restored);

    if updates.check_due() {
        info!("Startup update check is due");
        updates.check_update_available();
    } else {
        info!("Startup update check postponed by the user, skipping");
    }

    let window: Arc<dyn WindowHandle> = Arc::new(HeadlessWindow::new());
    let tray = TrayManager::new(
        Arc::clone(&timer),
        Arc::clone(&settings),
        Arc::clone(&controller),
        Arc::clone(&window),
    )
    .context("Failed to create tray manager")?;
    tray.check_init_state();

    let quit = run_event_loop(&tray, &app_rx, &updates);

    match quit {
        QuitRequest::Save => {
            info!("Quitting, saving the session");
            controller.save().context("Failed to save the session")?;
        }
        QuitRequest::Discard => {
            info!("Quitting, discarding the session");
            controller
                .clear()
                .context("Failed to clear the saved session")?;
        }
    }
    controller.stop();

    info!("Pausa shutting down");

    Ok(())
}

/// Drive the tray from the main thread until a quit is requested
fn run_event_loop(
    tray: &TrayManager,
    app_rx: &mpsc::Receiver<AppEvent>,
    updates: &Arc<UpdateController>,
) -> QuitRequest {
    loop {
        match app_rx.recv_timeout(Duration::from_millis(100)) {
            Ok(AppEvent::UpdateAvailable(result)) => handle_update_available(updates, &result),
            Ok(AppEvent::UpdateCheckFailed) => {
                warn!("Update check failed after exhausting its retry budget");
            }
            Ok(event) => tray.on_app_event(&event),
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                warn!("Controller event channel disconnected, shutting down");
                return QuitRequest::Save;
            }
        }

        #[cfg(windows)]
        {
            use tray_icon::{TrayIconEvent, menu::MenuEvent};

            while let Ok(event) = MenuEvent::receiver().try_recv() {
                if let Some(quit) = tray.handle_menu_event(&event.id) {
                    return quit;
                }
            }
            while let Ok(event) = TrayIconEvent::receiver().try_recv() {
                if matches!(event, TrayIconEvent::Click { .. }) {
                    tray.change_visibility();
                }
            }
        }
    }
}

/// Present an available update to the user and record the decision
#[cfg(windows)]
fn handle_update_available(updates: &Arc<UpdateController>, result: &UpdateCheckResult) {
    info!(
        "Update available: {} ({})",
        result.newest_version, result.platform_download_url
    );

    let description = if result.release_notes.is_empty() {
        format!("Version {} is available.", result.newest_version)
    } else {
        format!(
            "Version {} is available.\n\n{}",
            result.newest_version, result.release_notes
        )
    };
    let answer = rfd::MessageDialog::new()
        .set_title("Update available")
        .set_description(description)
        .set_buttons(rfd::MessageButtons::YesNoCancelCustom(
            "Download".to_string(),
            "Remind me later".to_string(),
            "Skip this version".to_string(),
        ))
        .show();

    let outcome = match answer {
        rfd::MessageDialogResult::Custom(label) if label == "Download" => {
            updates.download();
            Ok(())
        }
        rfd::MessageDialogResult::Custom(label) if label == "Skip this version" => updates.skip(),
        // "Remind me later", closed dialog, anything else
        _ => updates.postpone(),
    };
    if let Err(e) = outcome {
        warn!("Failed to record the update decision: {}", e);
    }
}

/// Announce an available update without a dialog (non-Windows)
#[cfg(not(windows))]
fn handle_update_available(updates: &Arc<UpdateController>, result: &UpdateCheckResult) {
    info!(
        "Update available: {} ({})",
        result.newest_version, result.platform_download_url
    );
    let notification = notify_rust::Notification::new()
        .summary("Pausa update available")
        .body(&format!(
            "Version {} is available for download.",
            result.newest_version
        ))
        .show();
    if let Err(e) = notification {
        warn!("Failed to show update notification: {}", e);
    }
    // Ask again after the postpone interval
    if let Err(e) = updates.postpone() {
        warn!("Failed to record the update decision: {}", e);
    }
}

/// Placeholder main window until a GUI front-end lands
///
/// Tracks visibility so the hide-to-tray transitions behave, and logs the
/// dialog requests.
struct HeadlessWindow {
    visible: AtomicBool,
}

impl HeadlessWindow {
    fn new() -> Self {
        Self {
            visible: AtomicBool::new(true),
        }
    }
}

impl WindowHandle for HeadlessWindow {
    fn show(&self) {
        self.visible.store(true, Ordering::SeqCst);
        debug!("Window shown");
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
        debug!("Window hidden");
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }

    fn show_break_dialog(&self) {
        debug!("Break dialog requested");
    }

    fn show_settings_dialog(&self) {
        debug!("Settings dialog requested");
    }

    fn show_about_dialog(&self) {
        debug!("About dialog requested");
    }
}
