//! Process-wide tray state and the icon-selection rule

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::icons::{default_icon, IconBytes};
use crate::registry::{BindingKind, Keybinding, LayerIcons};

/// Which icon slot is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconVariant {
    Light,
    Dark,
    Disconnected,
}

impl IconVariant {
    /// Disconnected wins over everything; otherwise dark mode picks the
    /// dark variant.
    pub fn select(connected: bool, dark_mode: bool) -> Self {
        match (connected, dark_mode) {
            (false, _) => IconVariant::Disconnected,
            (true, true) => IconVariant::Dark,
            (true, false) => IconVariant::Light,
        }
    }

    /// Pick the bytes for this variant. A missing layer shows the default icon.
    pub fn icon(self, layer: Option<&LayerIcons>, disconnect: &IconBytes) -> IconBytes {
        match (self, layer) {
            (IconVariant::Disconnected, _) => disconnect.clone(),
            (IconVariant::Dark, Some(icons)) => icons.dark.clone(),
            (IconVariant::Light, Some(icons)) => icons.light.clone(),
            (_, None) => default_icon(),
        }
    }
}

/// Which layer the machine is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerState {
    /// No layer chosen yet by an event or a restored snapshot
    #[default]
    Idle,
    /// This layer was selected
    Active(usize),
}

/// Label of the quiet menu item for a given quiet flag
pub fn quiet_label(quiet: bool) -> &'static str {
    if quiet {
        "Notify"
    } else {
        "Quiet"
    }
}

/// Title of the current-layer menu item
pub fn layer_title(name: &str) -> String {
    format!("{} Layer", name)
}

/// Single source of truth for layer, connection and display state.
///
/// Only the state machine mutates it.
#[derive(Debug)]
pub struct TrayState {
    pub(super) layer: LayerState,
    pub(super) layer_name: String,
    pub(super) connected: bool,
    pub(super) dark_mode: bool,
    pub(super) quiet: bool,
    quitting: Arc<AtomicBool>,
    bindings: Vec<Keybinding>,
    disconnect_icon: IconBytes,
}

impl TrayState {
    /// Create the post-registration default state
    pub fn new(
        bindings: Vec<Keybinding>,
        disconnect_icon: IconBytes,
        dark_mode: bool,
        quitting: Arc<AtomicBool>,
    ) -> Self {
        let layer_name = bindings
            .iter()
            .find(|b| b.kind == BindingKind::Layer(0))
            .map(|b| b.name.clone())
            .unwrap_or_default();

        Self {
            layer: LayerState::Idle,
            layer_name,
            connected: true,
            dark_mode,
            quiet: false,
            quitting,
            bindings,
            disconnect_icon,
        }
    }

    pub fn layer(&self) -> LayerState {
        self.layer
    }

    /// Current layer id; layer 0 until something is selected
    pub fn layer_id(&self) -> usize {
        match self.layer {
            LayerState::Idle => 0,
            LayerState::Active(id) => id,
        }
    }

    pub fn layer_name(&self) -> &str {
        &self.layer_name
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting.load(Ordering::SeqCst)
    }

    pub(super) fn set_quitting(&self) {
        self.quitting.store(true, Ordering::SeqCst);
    }

    pub fn bindings_mut(&mut self) -> &mut [Keybinding] {
        &mut self.bindings
    }

    /// Registered binding for a layer id
    pub fn find_layer(&self, id: usize) -> Option<&Keybinding> {
        self.bindings
            .iter()
            .find(|b| b.kind == BindingKind::Layer(id))
    }

    /// True if a registered layer binding has exactly this id and name
    pub fn matches(&self, id: usize, name: &str) -> bool {
        self.find_layer(id).is_some_and(|b| b.name == name)
    }

    pub fn icon_variant(&self) -> IconVariant {
        IconVariant::select(self.connected, self.dark_mode)
    }

    /// Icon for the current layer under the current flags
    pub fn current_icon(&self) -> IconBytes {
        let icons = self
            .find_layer(self.layer_id())
            .and_then(|b| b.icons.as_ref());
        self.icon_variant().icon(icons, &self.disconnect_icon)
    }

    pub fn title(&self) -> String {
        layer_title(&self.layer_name)
    }
}
