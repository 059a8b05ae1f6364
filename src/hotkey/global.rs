//! Hotkey backend built on the `global-hotkey` crate
//!
//! `global-hotkey` reports every press on one process-wide channel. A
//! dedicated dispatch thread drains it and routes key-downs to the
//! receiver of the matching registration.
//!
//! Linux only: on X11 `global-hotkey` runs its own event thread, so no
//! main-thread event loop is needed alongside the tokio runtime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use global_hotkey::hotkey::{Code, HotKey, Modifiers};
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::backend::{
    describe, HotkeyBackend, HotkeyError, HotkeyHandle, KeyDownReceiver, Registration,
};
use super::keys::{Key, ModifierSet};

type Routes = Arc<Mutex<HashMap<u32, mpsc::UnboundedSender<()>>>>;

/// OS-level global hotkeys
pub struct GlobalHotkeyBackend {
    manager: GlobalHotKeyManager,
    hotkeys: Mutex<HashMap<u32, HotKey>>,
    routes: Routes,
}

impl GlobalHotkeyBackend {
    /// Create the manager and start the dispatch thread
    pub fn new() -> Result<Self, HotkeyError> {
        let manager = GlobalHotKeyManager::new().map_err(|e| HotkeyError::Init(e.to_string()))?;
        let routes: Routes = Arc::default();

        let dispatch_routes = Arc::clone(&routes);
        thread::Builder::new()
            .name("hotkey-dispatch".to_string())
            .spawn(move || dispatch(dispatch_routes))
            .map_err(|e| HotkeyError::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            manager,
            hotkeys: Mutex::default(),
            routes,
        })
    }
}

/// Forward pressed events to their registration until the channel closes
fn dispatch(routes: Routes) {
    info!("hotkey dispatch thread started");
    let receiver = GlobalHotKeyEvent::receiver();

    while let Ok(event) = receiver.recv() {
        if event.state() != HotKeyState::Pressed {
            continue;
        }

        let routes = routes.lock().unwrap_or_else(PoisonError::into_inner);
        match routes.get(&event.id()) {
            Some(tx) => {
                if tx.send(()).is_err() {
                    debug!(id = event.id(), "key-down dropped, listener gone");
                }
            }
            None => debug!(id = event.id(), "key-down for unknown hotkey"),
        }
    }

    info!("hotkey dispatch thread stopped");
}

impl HotkeyBackend for GlobalHotkeyBackend {
    fn register(&self, modifiers: ModifierSet, key: Key) -> Result<Registration, HotkeyError> {
        let hotkey = HotKey::new(Some(to_platform_modifiers(modifiers)), to_code(key));

        self.manager
            .register(hotkey)
            .map_err(|e| HotkeyError::Register {
                combo: describe(modifiers, key),
                reason: e.to_string(),
            })?;

        let id = hotkey.id();
        let (tx, rx) = mpsc::unbounded_channel();
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, tx);
        self.hotkeys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, hotkey);

        debug!(id, combo = %describe(modifiers, key), "hotkey registered");

        Ok(Registration {
            handle: HotkeyHandle::new(id),
            keydown: KeyDownReceiver::new(rx),
        })
    }

    fn unregister(&self, handle: HotkeyHandle) -> Result<(), HotkeyError> {
        let id = handle.id();
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        let hotkey = self
            .hotkeys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        match hotkey {
            Some(hotkey) => self
                .manager
                .unregister(hotkey)
                .map_err(|e| HotkeyError::Unregister {
                    id,
                    reason: e.to_string(),
                }),
            None => {
                warn!(id, "unregister requested for unknown hotkey");
                Ok(())
            }
        }
    }
}

/// Map the four-symbol vocabulary onto platform modifiers.
///
/// `win` becomes Super, which `global-hotkey` maps to the Windows key,
/// Mod4 on X11 and Command on macOS.
fn to_platform_modifiers(modifiers: ModifierSet) -> Modifiers {
    let mut mods = Modifiers::empty();
    if modifiers.ctrl {
        mods |= Modifiers::CONTROL;
    }
    if modifiers.alt {
        mods |= Modifiers::ALT;
    }
    if modifiers.shift {
        mods |= Modifiers::SHIFT;
    }
    if modifiers.win {
        mods |= Modifiers::SUPER;
    }
    mods
}

fn to_code(key: Key) -> Code {
    match key {
        Key::Digit(0) => Code::Digit0,
        Key::Digit(1) => Code::Digit1,
        Key::Digit(2) => Code::Digit2,
        Key::Digit(3) => Code::Digit3,
        Key::Digit(4) => Code::Digit4,
        Key::Digit(5) => Code::Digit5,
        Key::Digit(6) => Code::Digit6,
        Key::Digit(7) => Code::Digit7,
        Key::Digit(8) => Code::Digit8,
        Key::Digit(_) => Code::Digit9,
        Key::Function(1) => Code::F1,
        Key::Function(2) => Code::F2,
        Key::Function(3) => Code::F3,
        Key::Function(4) => Code::F4,
        Key::Function(5) => Code::F5,
        Key::Function(6) => Code::F6,
        Key::Function(7) => Code::F7,
        Key::Function(8) => Code::F8,
        Key::Function(9) => Code::F9,
        Key::Function(10) => Code::F10,
        Key::Function(11) => Code::F11,
        Key::Function(_) => Code::F12,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_modifiers() {
        let mods = to_platform_modifiers(ModifierSet::parse("ctrl-shift-win-alt"));
        assert!(mods.contains(Modifiers::CONTROL));
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(mods.contains(Modifiers::ALT));
        assert!(mods.contains(Modifiers::SUPER));

        let mods = to_platform_modifiers(ModifierSet::parse("ctrl"));
        assert_eq!(mods, Modifiers::CONTROL);
    }

    #[test]
    fn test_key_codes() {
        assert_eq!(to_code(Key::Digit(0)), Code::Digit0);
        assert_eq!(to_code(Key::Digit(9)), Code::Digit9);
        assert_eq!(to_code(Key::Function(2)), Code::F2);
    }
}
