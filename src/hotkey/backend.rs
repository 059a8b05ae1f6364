//! Abstract global hotkey capability
//!
//! The core never talks to the OS directly. It registers a modifier+key
//! pair, awaits key-downs on the returned receiver, and hands the handle
//! back exactly once at shutdown.

use tokio::sync::mpsc;

use super::keys::{Key, ModifierSet};

/// Opaque handle to a registered OS hotkey.
///
/// Not `Clone`: unregistration consumes it, so a hotkey is released at
/// most once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct HotkeyHandle {
    id: u32,
}

impl HotkeyHandle {
    pub(crate) fn new(id: u32) -> Self {
        Self { id }
    }

    /// Backend-specific identifier
    pub fn id(&self) -> u32 {
        self.id
    }
}

/// Stream of key-down signals for one registered hotkey
#[derive(Debug)]
pub struct KeyDownReceiver(mpsc::UnboundedReceiver<()>);

impl KeyDownReceiver {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<()>) -> Self {
        Self(rx)
    }

    /// Wait for the next key-down. Returns `None` once the backend has
    /// dropped the hotkey.
    pub async fn next(&mut self) -> Option<()> {
        self.0.recv().await
    }
}

/// A successful registration
#[derive(Debug)]
pub struct Registration {
    pub handle: HotkeyHandle,
    pub keydown: KeyDownReceiver,
}

/// Errors that can occur while talking to the hotkey subsystem
#[derive(Debug, thiserror::Error)]
pub enum HotkeyError {
    #[error("failed to initialise hotkey manager: {0}")]
    Init(String),

    #[error("failed to register {combo}: {reason}")]
    Register { combo: String, reason: String },

    #[error("failed to unregister hotkey {id}: {reason}")]
    Unregister { id: u32, reason: String },

    #[error("failed to spawn dispatch thread: {0}")]
    ThreadSpawn(String),
}

/// The operations the core needs from a global hotkey subsystem
pub trait HotkeyBackend {
    /// Register a modifier+key combination. Fails when the combination is
    /// already claimed elsewhere.
    fn register(&self, modifiers: ModifierSet, key: Key) -> Result<Registration, HotkeyError>;

    /// Release a previously registered hotkey
    fn unregister(&self, handle: HotkeyHandle) -> Result<(), HotkeyError>;
}

/// Render a combination the way it is logged and reported
pub fn describe(modifiers: ModifierSet, key: Key) -> String {
    format!("{}+{}", modifiers, key)
}
