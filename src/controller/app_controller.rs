//! Application controller implementation
//!
//! Fans the per-component event channels into a single `AppEvent` stream and
//! drives the break schedule by comparing timer counters against the
//! configured durations.

use crate::config::{SavedSession, SettingsController, SettingsEvent};
use crate::error::Result;
use crate::timer::{PeriodType, TimerController, TimerEvent};
use crate::update::{UpdateCheckResult, UpdateEvent};
use parking_lot::Mutex;
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{info, warn};

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// No session running
    Off,
    /// Work session in progress
    Working,
    /// Break in progress
    Break,
}

/// Events the application controller publishes for the tray/UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// Application state changed
    StateChanged(State),
    /// The timed period switched between Work and Break
    PeriodChanged(PeriodType),
    /// Counters or durations changed; tooltip and menus should refresh
    Refresh,
    /// The configured work period elapsed, the user should take a break
    BreakRequested,
    /// The break duration elapsed, work resumed
    BreakEnded,
    /// The configured daily work time is used up
    WorkFinished,
    /// A newer, not yet acknowledged version is available
    UpdateAvailable(UpdateCheckResult),
    /// The update check exhausted its retry budget
    UpdateCheckFailed,
}

/// Break schedule bookkeeping
#[derive(Debug)]
struct Schedule {
    state: State,
    /// Accumulated postponement in seconds, reset when a break ends
    postponed_secs: u32,
    /// A break request was raised and not yet resolved
    break_requested: bool,
    /// The work-finished notification fired this session
    work_finished: bool,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            state: State::Off,
            postponed_secs: 0,
            break_requested: false,
            work_finished: false,
        }
    }
}

/// Central coordinator between timer, settings, and update checker
pub struct AppController {
    timer: Arc<TimerController>,
    settings: Arc<SettingsController>,
    schedule: Mutex<Schedule>,
    /// Fanned-out event stream for the tray/UI layer
    event_sender: mpsc::Sender<AppEvent>,
    /// Component channels, taken when the event loop starts
    timer_receiver: Mutex<Option<mpsc::Receiver<TimerEvent>>>,
    settings_receiver: Mutex<Option<mpsc::Receiver<SettingsEvent>>>,
    update_receiver: Mutex<Option<mpsc::Receiver<UpdateEvent>>>,
}

impl AppController {
    /// Create the controller wiring the component channels to `event_sender`
    pub fn new(
        timer: Arc<TimerController>,
        settings: Arc<SettingsController>,
        timer_receiver: mpsc::Receiver<TimerEvent>,
        settings_receiver: mpsc::Receiver<SettingsEvent>,
        update_receiver: mpsc::Receiver<UpdateEvent>,
        event_sender: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            timer,
            settings,
            schedule: Mutex::new(Schedule::default()),
            event_sender,
            timer_receiver: Mutex::new(Some(timer_receiver)),
            settings_receiver: Mutex::new(Some(settings_receiver)),
            update_receiver: Mutex::new(Some(update_receiver)),
        }
    }

    /// Current application state
    pub fn state(&self) -> State {
        self.schedule.lock().state
    }

    /// Start a work session
    ///
    /// With `restart` the timer counters are zeroed; without it the session
    /// resumes from the current counters (e.g. a restored save).
    pub fn start(&self, restart: bool) {
        if restart {
            let mut schedule = self.schedule.lock();
            schedule.postponed_secs = 0;
            schedule.break_requested = false;
            schedule.work_finished = false;
        }
        self.timer.count_work_time();
        self.timer.start(restart);
        self.set_state(State::Working);
        info!("Work session started (restart: {})", restart);
    }

    /// End the session, keeping nothing running
    pub fn stop(&self) {
        self.timer.stop();
        *self.schedule.lock() = Schedule::default();
        self.set_state(State::Off);
        info!("Work session stopped");
    }

    /// Switch the timer to break counting
    pub fn start_break(&self) {
        self.timer.count_break_time();
        self.set_state(State::Break);
        info!("Break started");
    }

    /// End the break: clear the per-period counters and resume work
    pub fn end_break(&self) {
        self.timer.count_work_time();
        self.timer.reset_period();
        {
            let mut schedule = self.schedule.lock();
            schedule.postponed_secs = 0;
            schedule.break_requested = false;
        }
        self.set_state(State::Working);
        let _ = self.event_sender.send(AppEvent::BreakEnded);
        notify("Break finished", "Back to work. The next break is scheduled.");
        info!("Break ended");
    }

    /// Push the pending break request out by the configured postpone time
    pub fn postpone_break(&self) {
        let postpone = self.settings.postpone_time();
        let mut schedule = self.schedule.lock();
        schedule.postponed_secs = schedule.postponed_secs.saturating_add(postpone);
        schedule.break_requested = false;
        info!(
            "Break postponed by {}s (total postponement {}s)",
            postpone, schedule.postponed_secs
        );
    }

    /// Persist the current timer counters for the next start
    pub fn save(&self) -> Result<()> {
        let session = SavedSession {
            elapsed_work_time: self.timer.elapsed_work_time(),
            elapsed_work_period: self.timer.elapsed_work_period(),
        };
        info!(
            "Saving session: {}s work, {}s in current period",
            session.elapsed_work_time, session.elapsed_work_period
        );
        self.settings.set_saved_session(session)
    }

    /// Discard any saved session
    pub fn clear(&self) -> Result<()> {
        self.settings.clear_saved_session()
    }

    /// Restore a saved session into the timer, if one exists
    ///
    /// Returns whether a session was restored.
    pub fn restore_saved_session(&self) -> bool {
        let session = self.settings.saved_session();
        if session.is_empty() {
            return false;
        }
        info!(
            "Restoring saved session: {}s work, {}s in current period",
            session.elapsed_work_time, session.elapsed_work_period
        );
        self.timer
            .restore(session.elapsed_work_time, session.elapsed_work_period);
        true
    }

    /// Run the event loop, fanning component events into `AppEvent`s
    ///
    /// Returns when the timer event channel disconnects. Uses a 100ms
    /// timeout on the timer channel so settings and update events are
    /// drained promptly.
    pub fn run(&self) {
        use std::sync::mpsc::{RecvTimeoutError, TryRecvError};

        let Some(timer_receiver) = self.timer_receiver.lock().take() else {
            warn!("Event loop already running; run() call ignored");
            return;
        };
        let Some(settings_receiver) = self.settings_receiver.lock().take() else {
            warn!("Event loop already running; run() call ignored");
            return;
        };
        let Some(update_receiver) = self.update_receiver.lock().take() else {
            warn!("Event loop already running; run() call ignored");
            return;
        };

        info!("Entering controller event loop");
        loop {
            match timer_receiver.recv_timeout(Duration::from_millis(100)) {
                Ok(event) => self.handle_timer_event(event),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("Timer event channel disconnected, exiting event loop");
                    break;
                }
            }

            loop {
                match settings_receiver.try_recv() {
                    Ok(event) => self.handle_settings_event(&event),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }

            loop {
                match update_receiver.try_recv() {
                    Ok(event) => self.handle_update_event(event),
                    Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
                }
            }
        }
    }

    /// Apply one timer event to the break schedule
    pub fn handle_timer_event(&self, event: TimerEvent) {
        match event {
            TimerEvent::ElapsedWorkPeriodChanged(period) => {
                self.check_break_due(period);
                let _ = self.event_sender.send(AppEvent::Refresh);
            }
            TimerEvent::ElapsedWorkTimeChanged(total) => {
                self.check_work_finished(total);
                let _ = self.event_sender.send(AppEvent::Refresh);
            }
            TimerEvent::ElapsedBreakDurationChanged(duration) => {
                self.check_break_over(duration);
            }
            TimerEvent::ActivePeriodTypeChanged(period_type) => {
                let _ = self.event_sender.send(AppEvent::PeriodChanged(period_type));
            }
        }
    }

    /// Apply one settings event; duration changes refresh the tray
    pub fn handle_settings_event(&self, event: &SettingsEvent) {
        match event {
            SettingsEvent::BreakIntervalChanged(_)
            | SettingsEvent::WorkTimeChanged(_)
            | SettingsEvent::BreakDurationChanged(_) => {
                let _ = self.event_sender.send(AppEvent::Refresh);
            }
            _ => {}
        }
    }

    /// Forward an update event, filtering already-acknowledged versions
    pub fn handle_update_event(&self, event: UpdateEvent) {
        match event {
            UpdateEvent::CheckFinished(result) => {
                if !result.update_available {
                    info!("Application is up to date");
                    return;
                }
                if result.newest_version == self.settings.update_version() {
                    info!(
                        "Update {} already acknowledged, not notifying",
                        result.newest_version
                    );
                    return;
                }
                let _ = self.event_sender.send(AppEvent::UpdateAvailable(result));
            }
            UpdateEvent::CheckError => {
                let _ = self.event_sender.send(AppEvent::UpdateCheckFailed);
            }
        }
    }

    fn check_break_due(&self, elapsed_work_period: u32) {
        let break_interval = self.settings.break_interval();
        if break_interval == 0 {
            return;
        }
        let mut schedule = self.schedule.lock();
        if schedule.state != State::Working || schedule.break_requested {
            return;
        }
        let due_at = break_interval.saturating_add(schedule.postponed_secs);
        if elapsed_work_period >= due_at {
            schedule.break_requested = true;
            drop(schedule);
            let _ = self.event_sender.send(AppEvent::BreakRequested);
            notify("Take a break!", "The configured work period has elapsed.");
        }
    }

    fn check_work_finished(&self, elapsed_work_time: u32) {
        let work_time = self.settings.work_time();
        if work_time == 0 {
            return;
        }
        let mut schedule = self.schedule.lock();
        if schedule.work_finished || elapsed_work_time < work_time {
            return;
        }
        schedule.work_finished = true;
        drop(schedule);
        let _ = self.event_sender.send(AppEvent::WorkFinished);
        notify("Work day finished", "The configured work time is used up.");
    }

    fn check_break_over(&self, elapsed_break_duration: u32) {
        let break_duration = self.settings.break_duration();
        if break_duration == 0 {
            return;
        }
        if self.schedule.lock().state == State::Break && elapsed_break_duration >= break_duration {
            self.end_break();
        }
    }

    fn set_state(&self, state: State) {
        {
            let mut schedule = self.schedule.lock();
            if schedule.state == state {
                return;
            }
            schedule.state = state;
        }
        let _ = self.event_sender.send(AppEvent::StateChanged(state));
    }
}

/// Best-effort desktop notification; failures only get logged
fn notify(summary: &str, body: &str) {
    let result = notify_rust::Notification::new()
        .summary(summary)
        .body(body)
        .timeout(notify_rust::Timeout::Milliseconds(5000))
        .show();
    if let Err(e) = result {
        warn!("Failed to show notification: {}", e);
    }
}
