//! Work/break timer module
//!
//! The timer is a small state machine ticking once per second. It knows which
//! period is being timed (Work or Break) and maintains three counters:
//!
//! - `elapsed_work_time`: total work time this session
//! - `elapsed_work_period`: work time since the last break
//! - `elapsed_break_duration`: time spent in the current break
//!
//! Period transitions are triggered explicitly by the caller; the timer has
//! no knowledge of the configured durations. Each counter change and period
//! transition is published as a [`TimerEvent`].

pub mod controller;

pub use controller::{PeriodType, TimerController, TimerEvent};
