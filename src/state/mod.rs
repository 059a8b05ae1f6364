//! Layer state machine module
//!
//! Tracks the current layer crossed with two independent flags:
//! - connected: the keyboard is reporting to this host
//! - dark mode: the dark icon variant is shown while connected
//!
//! plus a quiet flag that only gates notifications. The snapshot store
//! carries layer, connection and quiet across restarts.

mod machine;
mod store;
mod tray_state;

pub use machine::StateMachine;
pub use store::{SaveState, StateStore};
pub use tray_state::{quiet_label, IconVariant, LayerState, TrayState};
