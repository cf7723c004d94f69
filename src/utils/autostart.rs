//! Auto-start registration
//!
//! Manages the "run on login" registration. On Windows this writes the
//! current executable path to the per-user Run registry key; other
//! platforms are a no-op.

use crate::error::Result;

#[cfg(windows)]
const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";
#[cfg(windows)]
const APP_VALUE: &str = "Pausa";

/// Auto-start manager
pub struct AutoStartManager;

#[cfg(windows)]
impl AutoStartManager {
    /// Check if auto-start is enabled
    pub fn is_enabled() -> Result<bool> {
        use winreg::RegKey;
        use winreg::enums::HKEY_CURRENT_USER;

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let run = hkcu.open_subkey(RUN_KEY)?;
        Ok(run.get_value::<String, _>(APP_VALUE).is_ok())
    }

    /// Enable or disable auto-start on login
    pub fn set_enabled(enabled: bool) -> Result<()> {
        use winreg::RegKey;
        use winreg::enums::{HKEY_CURRENT_USER, KEY_SET_VALUE};

        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let run = hkcu.open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE)?;
        if enabled {
            let exe = std::env::current_exe()?;
            run.set_value(APP_VALUE, &exe.to_string_lossy().into_owned())?;
        } else {
            // Value may already be absent
            let _ = run.delete_value(APP_VALUE);
        }
        Ok(())
    }
}

#[cfg(not(windows))]
impl AutoStartManager {
    /// Check if auto-start is enabled (stub, always false off-Windows)
    pub fn is_enabled() -> Result<bool> {
        Ok(false)
    }

    /// Enable or disable auto-start (no-op off-Windows)
    pub fn set_enabled(_enabled: bool) -> Result<()> {
        Ok(())
    }
}
