//! Timer controller implementation
//!
//! Owns the tick state machine and the 1 Hz ticker thread. The state machine
//! itself is synchronous: `tick()` advances the counters for the active
//! period, and all mutations go through compare-and-set helpers so consumers
//! only see events for actual changes.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, mpsc};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// The period currently being timed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    /// Counting work time
    Work,
    /// Counting break time
    Break,
}

/// Change notification from the timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Total elapsed work time changed (seconds)
    ElapsedWorkTimeChanged(u32),
    /// Elapsed time in the current work period changed (seconds)
    ElapsedWorkPeriodChanged(u32),
    /// Elapsed break duration changed (seconds)
    ElapsedBreakDurationChanged(u32),
    /// The active period switched between Work and Break
    ActivePeriodTypeChanged(PeriodType),
}

/// Counter state mutated once per second by the tick handler
#[derive(Debug)]
struct TimerState {
    period_type: PeriodType,
    elapsed_work_time: u32,
    elapsed_work_period: u32,
    elapsed_break_duration: u32,
}

impl Default for TimerState {
    fn default() -> Self {
        Self {
            period_type: PeriodType::Work,
            elapsed_work_time: 0,
            elapsed_work_period: 0,
            elapsed_break_duration: 0,
        }
    }
}

/// Work/break timer with a one-second repeating tick
///
/// Transitions between Work and Break are triggered explicitly by the caller
/// via [`count_work_time`](Self::count_work_time) /
/// [`count_break_time`](Self::count_break_time); the controller has no
/// knowledge of the configured durations.
pub struct TimerController {
    /// Counter state, shared with the ticker thread
    state: Arc<Mutex<TimerState>>,
    /// Change event channel
    event_sender: mpsc::Sender<TimerEvent>,
    /// Whether ticks are currently being counted
    running: Arc<AtomicBool>,
    /// Tick interval, one second in production
    tick_interval: Duration,
}

impl TimerController {
    /// One second, the production tick interval
    pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// Create a stopped timer emitting events on `event_sender`
    pub fn new(event_sender: mpsc::Sender<TimerEvent>) -> Self {
        Self::with_tick_interval(event_sender, Self::TICK_INTERVAL)
    }

    /// Create a timer with a custom tick interval (shortened in tests)
    pub fn with_tick_interval(
        event_sender: mpsc::Sender<TimerEvent>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TimerState::default())),
            event_sender,
            running: Arc::new(AtomicBool::new(false)),
            tick_interval,
        }
    }

    /// Total elapsed work time in seconds
    pub fn elapsed_work_time(&self) -> u32 {
        self.state.lock().elapsed_work_time
    }

    /// Elapsed time within the current work period in seconds
    pub fn elapsed_work_period(&self) -> u32 {
        self.state.lock().elapsed_work_period
    }

    /// Elapsed duration of the current break in seconds
    pub fn elapsed_break_duration(&self) -> u32 {
        self.state.lock().elapsed_break_duration
    }

    /// The period currently being timed
    pub fn active_period_type(&self) -> PeriodType {
        self.state.lock().period_type
    }

    /// Whether ticks are currently counted
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Start counting ticks
    ///
    /// With `restart` the counters are zeroed before resuming; without it the
    /// timer resumes from its current counters.
    pub fn start(&self, restart: bool) {
        if restart {
            let mut state = self.state.lock();
            self.set_elapsed_break_duration(&mut state, 0);
            self.set_elapsed_work_period(&mut state, 0);
            self.set_elapsed_work_time(&mut state, 0);
        }
        self.running.store(true, Ordering::SeqCst);
        debug!("Timer started (restart: {})", restart);
    }

    /// Stop counting ticks, keeping the counters
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        debug!("Timer stopped");
    }

    /// Switch to counting break time; no-op when already in a break
    pub fn count_break_time(&self) {
        let mut state = self.state.lock();
        if state.period_type == PeriodType::Break {
            return;
        }
        state.period_type = PeriodType::Break;
        let _ = self
            .event_sender
            .send(TimerEvent::ActivePeriodTypeChanged(PeriodType::Break));
    }

    /// Switch to counting work time; no-op when already working
    pub fn count_work_time(&self) {
        let mut state = self.state.lock();
        if state.period_type == PeriodType::Work {
            return;
        }
        state.period_type = PeriodType::Work;
        let _ = self
            .event_sender
            .send(TimerEvent::ActivePeriodTypeChanged(PeriodType::Work));
    }

    /// Clear the per-period counters after a finished break
    ///
    /// Zeroes the current work period and break duration while preserving the
    /// total elapsed work time.
    pub fn reset_period(&self) {
        let mut state = self.state.lock();
        self.set_elapsed_work_period(&mut state, 0);
        self.set_elapsed_break_duration(&mut state, 0);
    }

    /// Seed the work counters, e.g. when restoring a saved session
    pub fn restore(&self, elapsed_work_time: u32, elapsed_work_period: u32) {
        let mut state = self.state.lock();
        self.set_elapsed_work_time(&mut state, elapsed_work_time);
        self.set_elapsed_work_period(&mut state, elapsed_work_period);
    }

    /// Advance the timer by one elapsed second of the active period
    pub fn tick(&self) {
        let mut state = self.state.lock();
        Self::tick_state(&mut state, &self.event_sender);
    }

    fn tick_state(state: &mut TimerState, event_sender: &mpsc::Sender<TimerEvent>) {
        match state.period_type {
            PeriodType::Work => {
                state.elapsed_work_period = state.elapsed_work_period.saturating_add(1);
                state.elapsed_work_time = state.elapsed_work_time.saturating_add(1);
                let _ = event_sender.send(TimerEvent::ElapsedWorkPeriodChanged(
                    state.elapsed_work_period,
                ));
                let _ = event_sender.send(TimerEvent::ElapsedWorkTimeChanged(
                    state.elapsed_work_time,
                ));
            }
            PeriodType::Break => {
                state.elapsed_break_duration = state.elapsed_break_duration.saturating_add(1);
                let _ = event_sender.send(TimerEvent::ElapsedBreakDurationChanged(
                    state.elapsed_break_duration,
                ));
            }
        }
    }

    /// Add whole minutes to both work counters
    pub fn add_time(&self, minutes: u32) {
        let seconds = minutes.saturating_mul(60);
        let mut state = self.state.lock();
        let period = state.elapsed_work_period.saturating_add(seconds);
        let total = state.elapsed_work_time.saturating_add(seconds);
        self.set_elapsed_work_period(&mut state, period);
        self.set_elapsed_work_time(&mut state, total);
    }

    /// Subtract whole minutes from both work counters, clamping at zero
    pub fn subtract_time(&self, minutes: u32) {
        let seconds = minutes.saturating_mul(60);
        let mut state = self.state.lock();
        let period = state.elapsed_work_period.saturating_sub(seconds);
        let total = state.elapsed_work_time.saturating_sub(seconds);
        self.set_elapsed_work_period(&mut state, period);
        self.set_elapsed_work_time(&mut state, total);
    }

    /// Spawn the ticker thread driving [`tick`](Self::tick) while started
    ///
    /// The thread runs for the lifetime of the process; `start`/`stop` gate
    /// whether a tick is counted.
    pub fn spawn_ticker(&self) -> JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let running = Arc::clone(&self.running);
        let event_sender = self.event_sender.clone();
        let interval = self.tick_interval;

        thread::spawn(move || {
            loop {
                thread::sleep(interval);
                if running.load(Ordering::SeqCst) {
                    let mut state = state.lock();
                    Self::tick_state(&mut state, &event_sender);
                }
            }
        })
    }

    fn set_elapsed_work_time(&self, state: &mut TimerState, value: u32) {
        if state.elapsed_work_time == value {
            return;
        }
        state.elapsed_work_time = value;
        let _ = self
            .event_sender
            .send(TimerEvent::ElapsedWorkTimeChanged(value));
    }

    fn set_elapsed_work_period(&self, state: &mut TimerState, value: u32) {
        if state.elapsed_work_period == value {
            return;
        }
        state.elapsed_work_period = value;
        let _ = self
            .event_sender
            .send(TimerEvent::ElapsedWorkPeriodChanged(value));
    }

    fn set_elapsed_break_duration(&self, state: &mut TimerState, value: u32) {
        if state.elapsed_break_duration == value {
            return;
        }
        state.elapsed_break_duration = value;
        let _ = self
            .event_sender
            .send(TimerEvent::ElapsedBreakDurationChanged(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timer() -> (TimerController, mpsc::Receiver<TimerEvent>) {
        let (tx, rx) = mpsc::channel();
        (TimerController::new(tx), rx)
    }

    #[test]
    fn test_tick_counts_work_time() {
        let (timer, rx) = timer();
        timer.start(true);

        timer.tick();
        timer.tick();

        assert_eq!(timer.elapsed_work_time(), 2);
        assert_eq!(timer.elapsed_work_period(), 2);
        assert_eq!(timer.elapsed_break_duration(), 0);

        assert_eq!(rx.try_recv().unwrap(), TimerEvent::ElapsedWorkPeriodChanged(1));
        assert_eq!(rx.try_recv().unwrap(), TimerEvent::ElapsedWorkTimeChanged(1));
    }

    #[test]
    fn test_tick_counts_break_duration() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.count_break_time();

        timer.tick();

        assert_eq!(timer.elapsed_break_duration(), 1);
        // Work counters untouched during a break
        assert_eq!(timer.elapsed_work_time(), 0);
        assert_eq!(timer.elapsed_work_period(), 0);
    }

    #[test]
    fn test_period_transition_is_idempotent() {
        let (timer, rx) = timer();

        timer.count_break_time();
        timer.count_break_time();

        assert_eq!(
            rx.try_recv().unwrap(),
            TimerEvent::ActivePeriodTypeChanged(PeriodType::Break)
        );
        assert!(rx.try_recv().is_err(), "second transition must not emit");
    }

    #[test]
    fn test_restart_zeroes_counters() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.add_time(5);
        timer.count_break_time();
        timer.tick();

        timer.start(true);

        assert_eq!(timer.elapsed_work_time(), 0);
        assert_eq!(timer.elapsed_work_period(), 0);
        assert_eq!(timer.elapsed_break_duration(), 0);
        // restart does not change the active period
        assert_eq!(timer.active_period_type(), PeriodType::Break);
    }

    #[test]
    fn test_resume_keeps_counters() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.tick();
        timer.stop();
        assert!(!timer.is_running());

        timer.start(false);

        assert!(timer.is_running());
        assert_eq!(timer.elapsed_work_time(), 1);
    }

    #[test]
    fn test_add_time_adjusts_both_work_counters() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.tick();

        timer.add_time(2);

        assert_eq!(timer.elapsed_work_time(), 121);
        assert_eq!(timer.elapsed_work_period(), 121);
    }

    #[test]
    fn test_subtract_time_clamps_at_zero() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.add_time(1);

        timer.subtract_time(10);

        assert_eq!(timer.elapsed_work_time(), 0);
        assert_eq!(timer.elapsed_work_period(), 0);
    }

    #[test]
    fn test_subtract_time_partial() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.add_time(3);

        timer.subtract_time(1);

        assert_eq!(timer.elapsed_work_time(), 120);
        assert_eq!(timer.elapsed_work_period(), 120);
    }

    #[test]
    fn test_reset_period_preserves_total() {
        let (timer, _rx) = timer();
        timer.start(true);
        timer.add_time(1);
        timer.count_break_time();
        timer.tick();

        timer.reset_period();

        assert_eq!(timer.elapsed_work_time(), 60);
        assert_eq!(timer.elapsed_work_period(), 0);
        assert_eq!(timer.elapsed_break_duration(), 0);
    }

    #[test]
    fn test_restore_seeds_work_counters() {
        let (timer, _rx) = timer();

        timer.restore(3600, 900);

        assert_eq!(timer.elapsed_work_time(), 3600);
        assert_eq!(timer.elapsed_work_period(), 900);
    }

    #[test]
    fn test_ticker_thread_respects_running_flag() {
        let (tx, _rx) = mpsc::channel();
        let timer = TimerController::with_tick_interval(tx, Duration::from_millis(5));
        let _handle = timer.spawn_ticker();

        // Not started yet, ticks must not count
        thread::sleep(Duration::from_millis(40));
        assert_eq!(timer.elapsed_work_time(), 0);

        timer.start(true);
        thread::sleep(Duration::from_millis(60));
        timer.stop();
        assert!(timer.elapsed_work_time() > 0);

        let frozen = timer.elapsed_work_time();
        thread::sleep(Duration::from_millis(40));
        assert_eq!(timer.elapsed_work_time(), frozen);
    }
}
