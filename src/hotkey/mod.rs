//! Hotkey module for global keyboard event listening
//!
//! Parses configured combinations, registers them through a backend and
//! turns key-downs into state machine events.

mod backend;
#[cfg(target_os = "linux")]
mod global;
mod keys;
mod listener;
#[cfg(not(target_os = "linux"))]
mod unsupported;

pub use backend::{describe, HotkeyBackend, HotkeyError, HotkeyHandle, KeyDownReceiver};
#[cfg(test)]
pub use backend::fake;
#[cfg(target_os = "linux")]
pub use global::GlobalHotkeyBackend;
pub use keys::{Key, KeyParseError, ModifierSet};
pub use listener::spawn_all;
#[cfg(not(target_os = "linux"))]
pub use unsupported::GlobalHotkeyBackend;
