//! Utility modules
//!
//! Provides auto-start management, logging initialization, and time
//! formatting helpers.

pub mod autostart;
pub mod format;
pub mod logging;

pub use autostart::AutoStartManager;
pub use format::format_time;
pub use logging::init_logging;
