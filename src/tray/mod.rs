//! System tray integration
//!
//! Composes the timer, settings, and application controller to drive the
//! tray icon, its context menu, and the main-window visibility transitions.
//! The actual tray icon is Windows-only (as is the rest of the desktop
//! integration); the tooltip and menu-state logic is platform-neutral and
//! unit-tested.

pub mod manager;

pub use manager::{QuitRequest, TrayManager, WindowHandle, desktop_tray_available};
