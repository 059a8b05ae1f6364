//! Runtime keybinding records

use std::fmt;

use crate::hotkey::{HotkeyHandle, Key, ModifierSet};
use crate::icons::IconBytes;

/// What a registered hotkey does when pressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingKind {
    /// Select the layer with this id
    Layer(usize),
    /// Report the current layer
    Info,
    /// Flip the connection flag
    ConnectToggle,
}

impl BindingKind {
    /// Numeric id as persisted and logged; global bindings report -1
    pub fn id(&self) -> i64 {
        match self {
            BindingKind::Layer(id) => *id as i64,
            BindingKind::Info | BindingKind::ConnectToggle => -1,
        }
    }
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::Layer(id) => write!(f, "layer {}", id),
            BindingKind::Info => write!(f, "info"),
            BindingKind::ConnectToggle => write!(f, "connect toggle"),
        }
    }
}

/// Light and dark variants of a layer's icon
#[derive(Debug, Clone)]
pub struct LayerIcons {
    pub light: IconBytes,
    pub dark: IconBytes,
}

/// A registered hotkey and everything needed to act on it
#[derive(Debug)]
pub struct Keybinding {
    pub kind: BindingKind,
    pub name: String,
    pub modifiers: ModifierSet,
    pub key: Key,
    /// Present for layer bindings only
    pub icons: Option<LayerIcons>,
    handle: Option<HotkeyHandle>,
}

impl Keybinding {
    pub fn new(
        kind: BindingKind,
        name: impl Into<String>,
        modifiers: ModifierSet,
        key: Key,
        icons: Option<LayerIcons>,
        handle: HotkeyHandle,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            modifiers,
            key,
            icons,
            handle: Some(handle),
        }
    }

    /// Layer id, if this is a layer binding
    pub fn layer_id(&self) -> Option<usize> {
        match self.kind {
            BindingKind::Layer(id) => Some(id),
            _ => None,
        }
    }

    /// Take the OS handle for release. Returns `None` once taken.
    pub fn take_handle(&mut self) -> Option<HotkeyHandle> {
        self.handle.take()
    }

    pub fn is_registered(&self) -> bool {
        self.handle.is_some()
    }
}
