//! Hotkey backend for platforms without a supported hotkey source
//!
//! `global-hotkey` only delivers presses on macOS and Windows while the
//! platform event loop runs on the main thread. This process runs tokio on
//! the main thread instead, so those platforms refuse at startup rather than
//! registering hotkeys that can never fire.

use super::backend::{HotkeyBackend, HotkeyError, HotkeyHandle, Registration};
use super::keys::{Key, ModifierSet};

const UNSUPPORTED: &str = "unsupported platform";

pub struct GlobalHotkeyBackend;

impl GlobalHotkeyBackend {
    pub fn new() -> Result<Self, HotkeyError> {
        Err(HotkeyError::Init(UNSUPPORTED.to_string()))
    }
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, _modifiers: ModifierSet, _key: Key) -> Result<Registration, HotkeyError> {
        Err(HotkeyError::Init(UNSUPPORTED.to_string()))
    }

    fn unregister(&self, _handle: HotkeyHandle) -> Result<(), HotkeyError> {
        Ok(())
    }
}
