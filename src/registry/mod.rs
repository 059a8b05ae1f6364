//! Layer registry
//!
//! Builds the ordered set of keybindings from configuration and registers
//! each with the hotkey backend.

mod builder;
mod keybinding;

pub use builder::{
    BindingError, GlobalBindingError, LayerRegistry, Listener, Registry, SkippedLayer,
};
pub use keybinding::{BindingKind, Keybinding, LayerIcons};
