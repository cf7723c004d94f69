//! Integration tests for Pausa
//!
//! Exercises the full pipeline: timer ticker thread feeding the controller
//! event loop, settings persistence across controller instances, and the
//! update checker driving application events end to end.

use pausa::{
    config::{AppConfig, ConfigManager, SettingsController},
    controller::{AppController, AppEvent, State},
    error::{PausaError, StringError, get_user_friendly_error},
    timer::TimerController,
    update::{FetchResponse, UpdateController, VersionFetch},
};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::{Duration, Instant};

/// Everything wired together the way `main` does it, with short durations
/// and a fast ticker so a whole break cycle fits in a test
struct App {
    controller: Arc<AppController>,
    timer: Arc<TimerController>,
    settings: Arc<SettingsController>,
    app_rx: mpsc::Receiver<AppEvent>,
    update_tx: mpsc::Sender<pausa::update::UpdateEvent>,
    _dir: tempfile::TempDir,
}

fn build_app() -> App {
    let dir = tempfile::tempdir().unwrap();

    let mut config = AppConfig::default();
    config.durations.break_interval = 3;
    config.durations.break_duration = 2;
    config.durations.work_time = 100;
    config.durations.postpone_time = 2;

    let (settings_tx, settings_rx) = mpsc::channel();
    let settings = Arc::new(SettingsController::new(
        config,
        dir.path().join("config.json"),
        settings_tx,
    ));

    let (timer_tx, timer_rx) = mpsc::channel();
    let timer = Arc::new(TimerController::with_tick_interval(
        timer_tx,
        Duration::from_millis(10),
    ));
    let _ticker = timer.spawn_ticker();

    let (update_tx, update_rx) = mpsc::channel();
    let (app_tx, app_rx) = mpsc::channel();

    let controller = Arc::new(AppController::new(
        Arc::clone(&timer),
        Arc::clone(&settings),
        timer_rx,
        settings_rx,
        update_rx,
        app_tx,
    ));

    {
        let controller = Arc::clone(&controller);
        thread::spawn(move || controller.run());
    }

    App {
        controller,
        timer,
        settings,
        app_rx,
        update_tx,
        _dir: dir,
    }
}

/// Wait for a matching event, failing the test after `timeout`
fn wait_for<F: Fn(&AppEvent) -> bool>(
    rx: &mpsc::Receiver<AppEvent>,
    timeout: Duration,
    pred: F,
) -> AppEvent {
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline
            .checked_duration_since(Instant::now())
            .unwrap_or_else(|| panic!("Timed out waiting for expected event"));
        match rx.recv_timeout(remaining) {
            Ok(event) if pred(&event) => return event,
            Ok(_) => {}
            Err(e) => panic!("Timed out waiting for expected event: {e}"),
        }
    }
}

#[test]
fn test_config_persistence_integration() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let mut config = AppConfig::default();
    config.durations.break_interval = 1800;
    config.preferences.application_color = "#EC811B".to_string();
    config.update.update_version = "2.1".to_string();

    ConfigManager::save_to(&path, &config).unwrap();
    let loaded = ConfigManager::load_from(&path).unwrap();

    assert_eq!(loaded, config);
}

#[test]
fn test_full_break_cycle_integration() {
    let app = build_app();
    app.controller.start(true);

    wait_for(&app.app_rx, Duration::from_secs(5), |e| {
        *e == AppEvent::BreakRequested
    });
    assert_eq!(app.controller.state(), State::Working);

    app.controller.start_break();
    wait_for(&app.app_rx, Duration::from_secs(5), |e| {
        *e == AppEvent::BreakEnded
    });

    // after the break the period counter restarted from zero, work resumed
    assert_eq!(app.controller.state(), State::Working);
    assert!(app.timer.elapsed_work_period() < 3);
    assert!(app.timer.is_running());

    app.controller.stop();
    assert_eq!(app.controller.state(), State::Off);
}

#[test]
fn test_settings_change_refreshes_through_event_loop() {
    let app = build_app();

    // drain the startup noise first
    while app.app_rx.try_recv().is_ok() {}

    app.settings.set_break_interval(600).unwrap();
    wait_for(&app.app_rx, Duration::from_secs(2), |e| {
        *e == AppEvent::Refresh
    });
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    // first run: count some work and save on quit
    {
        let (settings_tx, settings_rx) = mpsc::channel();
        let settings = Arc::new(SettingsController::new(
            AppConfig::default(),
            path.clone(),
            settings_tx,
        ));
        let (timer_tx, timer_rx) = mpsc::channel();
        let timer = Arc::new(TimerController::new(timer_tx));
        let (_update_tx, update_rx) = mpsc::channel();
        let (app_tx, _app_rx) = mpsc::channel();
        let controller = AppController::new(
            Arc::clone(&timer),
            settings,
            timer_rx,
            settings_rx,
            update_rx,
            app_tx,
        );

        controller.start(true);
        timer.tick();
        timer.tick();
        controller.save().unwrap();
    }

    // second run: a fresh stack over the same config file restores it
    {
        let (settings_tx, settings_rx) = mpsc::channel();
        let settings = Arc::new(SettingsController::new(
            ConfigManager::load_from(&path).unwrap(),
            path.clone(),
            settings_tx,
        ));
        let (timer_tx, timer_rx) = mpsc::channel();
        let timer = Arc::new(TimerController::new(timer_tx));
        let (_update_tx, update_rx) = mpsc::channel();
        let (app_tx, _app_rx) = mpsc::channel();
        let controller = AppController::new(
            Arc::clone(&timer),
            settings,
            timer_rx,
            settings_rx,
            update_rx,
            app_tx,
        );

        assert!(controller.restore_saved_session());
        assert_eq!(timer.elapsed_work_time(), 2);
        assert_eq!(timer.elapsed_work_period(), 2);

        controller.clear().unwrap();
        assert!(!controller.restore_saved_session());
    }
}

/// Transport double serving a fixed manifest
struct FixedManifest(&'static str);

impl VersionFetch for FixedManifest {
    fn get(&self, _url: &str) -> pausa::error::Result<FetchResponse> {
        Ok(FetchResponse {
            status: 200,
            location: None,
            body: self.0.to_string(),
        })
    }
}

#[test]
fn test_update_check_reaches_event_loop() {
    let app = build_app();

    let manifest = r#"{
        "version": "99.0",
        "releaseNotes": "Lots of fixes",
        "urls": {
            "windows": {"32bit": "https://example.com/w32", "64bit": "https://example.com/w64"},
            "linux": {"32bit": "https://example.com/l32", "64bit": "https://example.com/l64"}
        }
    }"#;
    let mut updates = UpdateController::with_fetch(
        "https://example.com/current.json",
        Arc::clone(&app.settings),
        app.update_tx.clone(),
        Box::new(FixedManifest(manifest)),
        Duration::ZERO,
    );
    updates.set_current_version("1.0");
    let updates = Arc::new(updates);

    assert!(updates.check_due());
    updates.check_update_available();

    let event = wait_for(&app.app_rx, Duration::from_secs(5), |e| {
        matches!(e, AppEvent::UpdateAvailable(_))
    });
    let AppEvent::UpdateAvailable(result) = event else {
        unreachable!()
    };
    assert_eq!(result.newest_version, "99.0");
    assert_eq!(result.release_notes, "Lots of fixes");
    assert!(result.update_available);
    assert!(!result.platform_download_url.is_empty());

    // postponing acknowledges the version and schedules the next check
    updates.postpone().unwrap();
    assert_eq!(app.settings.update_version(), "99.0");
    assert!(!updates.check_due());

    // an acknowledged version is not announced again
    updates.check_update_available();
    thread::sleep(Duration::from_millis(300));
    while let Ok(event) = app.app_rx.try_recv() {
        assert!(
            !matches!(event, AppEvent::UpdateAvailable(_)),
            "acknowledged update must not be announced again"
        );
    }
}

#[test]
fn test_user_friendly_error_messages() {
    let error = PausaError::ConfigError(StringError::new("test"));
    assert!(get_user_friendly_error(&error).contains("configuration"));

    let error = PausaError::UpdateCheckFailed("status 503".to_string());
    assert!(get_user_friendly_error(&error).contains("network connection"));
}
