//! Events flowing into and out of the layer state machine
//!
//! `TrayEvent`s are produced by hotkey listeners and menu clicks and
//! consumed, one at a time, by the state machine. `StateEvent`s are the
//! side effects it asks the tray and notification sinks to perform.

use std::fmt;

use crate::icons::IconBytes;
use crate::registry::BindingKind;
use crate::state::IconVariant;

/// Inputs to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    /// The hotkey for this layer fired
    SelectLayer(usize),
    /// The connection-toggle hotkey fired
    ToggleConnection,
    /// The info hotkey fired
    Info,
    /// The Quiet/Notify menu item was clicked
    ToggleQuiet,
    /// Quit was requested from the menu or a signal
    Quit,
}

impl From<BindingKind> for TrayEvent {
    fn from(kind: BindingKind) -> Self {
        match kind {
            BindingKind::Layer(id) => TrayEvent::SelectLayer(id),
            BindingKind::Info => TrayEvent::Info,
            BindingKind::ConnectToggle => TrayEvent::ToggleConnection,
        }
    }
}

/// Side effects emitted by the state machine during transitions
#[derive(Debug, Clone)]
pub enum StateEvent {
    /// The tray icon should change
    IconChanged {
        variant: IconVariant,
        icon: IconBytes,
    },

    /// The current-layer label should change
    TitleChanged { title: String },

    /// The Quiet/Notify menu label should change
    QuietChanged { quiet: bool, label: &'static str },

    /// A desktop notification should be shown
    Notify { summary: String, body: String },
}

impl fmt::Display for StateEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateEvent::IconChanged { variant, icon } => {
                write!(f, "ICON_CHANGED ({:?}, {} bytes)", variant, icon.len())
            }
            StateEvent::TitleChanged { title } => write!(f, "TITLE_CHANGED ({})", title),
            StateEvent::QuietChanged { label, .. } => write!(f, "QUIET_CHANGED ({})", label),
            StateEvent::Notify { summary, .. } => write!(f, "NOTIFY ({})", summary),
        }
    }
}
