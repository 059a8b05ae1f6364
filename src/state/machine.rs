//! Core layer state machine
//!
//! Owns the `TrayState` and consumes `TrayEvent`s from a single channel,
//! so every transition is atomic with respect to every other. Side effects
//! are published as `StateEvent`s.

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::events::{StateEvent, TrayEvent};

use super::store::SaveState;
use super::tray_state::{quiet_label, LayerState, TrayState};

/// Whether the run loop should keep consuming events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The state machine that manages layer transitions
pub struct StateMachine {
    state: TrayState,
    /// Channel for emitting side effects
    event_tx: broadcast::Sender<StateEvent>,
}

impl StateMachine {
    /// Create a new state machine around the post-registration state
    pub fn new(state: TrayState, event_tx: broadcast::Sender<StateEvent>) -> Self {
        Self { state, event_tx }
    }

    pub fn state(&self) -> &TrayState {
        &self.state
    }

    /// Hand the final state back for shutdown
    pub fn into_state(self) -> TrayState {
        self.state
    }

    /// Apply a previous snapshot, silently, then publish the current view.
    ///
    /// The snapshot is only applied if a registered layer binding has the
    /// same id and name. Returns whether it was applied.
    pub fn restore(&mut self, snapshot: Option<SaveState>) -> bool {
        let applied = match snapshot {
            Some(snapshot) if self.state.matches(snapshot.id, &snapshot.name) => {
                self.state.layer = LayerState::Active(snapshot.id);
                self.state.layer_name = snapshot.name;
                self.state.connected = snapshot.is_connected;
                self.state.quiet = snapshot.quiet;
                info!(
                    layer = self.state.layer_id(),
                    name = %self.state.layer_name,
                    connected = self.state.connected,
                    quiet = self.state.quiet,
                    "restored previous state"
                );
                true
            }
            Some(snapshot) => {
                info!(
                    id = snapshot.id,
                    name = %snapshot.name,
                    "previous layer no longer configured, starting at default"
                );
                false
            }
            None => false,
        };

        self.publish_icon();
        self.publish_title();
        self.publish_quiet();
        applied
    }

    /// Run the state machine until Quit or until every sender is gone
    pub async fn run(&mut self, mut event_rx: mpsc::Receiver<TrayEvent>) {
        info!(layer = self.state.layer_id(), "state machine started");

        while let Some(event) = event_rx.recv().await {
            if self.handle_event(event) == Flow::Quit {
                break;
            }
        }

        info!("state machine stopped");
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: TrayEvent) -> Flow {
        if self.state.is_quitting() {
            debug!(?event, "ignoring event while quitting");
            return Flow::Quit;
        }

        match event {
            TrayEvent::SelectLayer(id) => self.select_layer(id),
            TrayEvent::ToggleConnection => self.toggle_connection(),
            TrayEvent::Info => self.info(),
            TrayEvent::ToggleQuiet => self.toggle_quiet(),
            TrayEvent::Quit => {
                self.state.set_quitting();
                info!("quit requested");
                return Flow::Quit;
            }
        }

        Flow::Continue
    }

    fn select_layer(&mut self, id: usize) {
        if self.state.layer == LayerState::Active(id) {
            return;
        }

        let Some(name) = self.state.find_layer(id).map(|b| b.name.clone()) else {
            warn!(id, "select for unregistered layer");
            return;
        };

        info!(from = self.state.layer_id(), to = id, %name, "layer transition");

        self.state.layer = LayerState::Active(id);
        self.state.layer_name = name;

        self.publish_icon();
        self.publish_title();

        if !self.state.quiet {
            self.emit(StateEvent::Notify {
                summary: "Layer Swapped".to_string(),
                body: format!("Swapped to {} layer", self.state.layer_name),
            });
        }
    }

    fn toggle_connection(&mut self) {
        self.state.connected = !self.state.connected;
        info!(connected = self.state.connected, "connection toggled");
        self.publish_icon();
    }

    fn info(&self) {
        let event = if self.state.connected {
            StateEvent::Notify {
                summary: self.state.layer_name.clone(),
                body: format!("The current keybinding layer is {}", self.state.layer_name),
            }
        } else {
            StateEvent::Notify {
                summary: "Disconnected".to_string(),
                body: "The keyboard is currently not connected...".to_string(),
            }
        };
        self.emit(event);
    }

    fn toggle_quiet(&mut self) {
        self.state.quiet = !self.state.quiet;
        info!(quiet = self.state.quiet, "quiet toggled");
        self.publish_quiet();
    }

    fn publish_icon(&self) {
        self.emit(StateEvent::IconChanged {
            variant: self.state.icon_variant(),
            icon: self.state.current_icon(),
        });
    }

    fn publish_title(&self) {
        self.emit(StateEvent::TitleChanged {
            title: self.state.title(),
        });
    }

    fn publish_quiet(&self) {
        self.emit(StateEvent::QuietChanged {
            quiet: self.state.quiet,
            label: quiet_label(self.state.quiet),
        });
    }

    fn emit(&self, event: StateEvent) {
        debug!(%event, "emitting state event");
        // Nobody listening yet is not an error
        let _ = self.event_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::hotkey::{HotkeyHandle, Key, ModifierSet};
    use crate::icons::IconBytes;
    use crate::registry::{BindingKind, Keybinding, LayerIcons};
    use crate::state::IconVariant;

    fn binding(id: usize, name: &str) -> Keybinding {
        let light = format!("{}-light", name.to_lowercase());
        let dark = format!("{}-dark", name.to_lowercase());
        Keybinding::new(
            BindingKind::Layer(id),
            name,
            ModifierSet::parse("ctrl"),
            Key::Digit(id as u8 + 1),
            Some(LayerIcons {
                light: IconBytes::from(light.into_bytes()),
                dark: IconBytes::from(dark.into_bytes()),
            }),
            HotkeyHandle::new(id as u32),
        )
    }

    fn create_state_machine(dark_mode: bool) -> (StateMachine, broadcast::Receiver<StateEvent>) {
        let state = TrayState::new(
            vec![binding(0, "Gaming"), binding(1, "Office")],
            IconBytes::from(&b"disconnected"[..]),
            dark_mode,
            Arc::default(),
        );
        let (tx, rx) = broadcast::channel(64);
        (StateMachine::new(state, tx), rx)
    }

    fn drain(rx: &mut broadcast::Receiver<StateEvent>) -> Vec<StateEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    fn icon_of(event: &StateEvent) -> Option<&[u8]> {
        match event {
            StateEvent::IconChanged { icon, .. } => Some(&icon[..]),
            _ => None,
        }
    }

    fn notifications(events: &[StateEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, StateEvent::Notify { .. }))
            .count()
    }

    #[test]
    fn test_initial_state() {
        let (sm, _) = create_state_machine(false);
        assert_eq!(sm.state().layer(), LayerState::Idle);
        assert_eq!(sm.state().layer_id(), 0);
        assert!(sm.state().is_connected());
    }

    #[test]
    fn test_select_layer_updates_icon_title_and_notifies() {
        let (mut sm, mut rx) = create_state_machine(false);

        sm.handle_event(TrayEvent::SelectLayer(1));

        assert_eq!(sm.state().layer(), LayerState::Active(1));
        assert_eq!(sm.state().layer_name(), "Office");

        let events = drain(&mut rx);
        assert_eq!(icon_of(&events[0]), Some(&b"office-light"[..]));
        assert!(matches!(&events[1], StateEvent::TitleChanged { title } if title == "Office Layer"));
        assert!(matches!(
            &events[2],
            StateEvent::Notify { summary, body }
                if summary == "Layer Swapped" && body == "Swapped to Office layer"
        ));
        assert_eq!(events.len(), 3);
    }

    #[test]
    fn test_select_from_idle_activates_layer_zero() {
        let (mut sm, mut rx) = create_state_machine(false);

        sm.handle_event(TrayEvent::SelectLayer(0));

        assert_eq!(sm.state().layer(), LayerState::Active(0));
        assert_eq!(notifications(&drain(&mut rx)), 1);
    }

    #[test]
    fn test_repeated_select_is_idempotent() {
        let (mut sm, mut rx) = create_state_machine(false);

        sm.handle_event(TrayEvent::SelectLayer(1));
        let first = drain(&mut rx);

        sm.handle_event(TrayEvent::SelectLayer(1));
        sm.handle_event(TrayEvent::SelectLayer(1));

        assert_eq!(first.len(), 3);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_quiet_suppresses_only_notification() {
        let (mut sm, mut rx) = create_state_machine(false);

        sm.handle_event(TrayEvent::ToggleQuiet);
        let events = drain(&mut rx);
        assert!(matches!(
            events[..],
            [StateEvent::QuietChanged { quiet: true, label: "Notify" }]
        ));

        sm.handle_event(TrayEvent::SelectLayer(1));
        let events = drain(&mut rx);
        assert_eq!(notifications(&events), 0);
        assert_eq!(events.len(), 2);
        assert_eq!(sm.state().layer_name(), "Office");

        sm.handle_event(TrayEvent::ToggleQuiet);
        assert!(matches!(
            drain(&mut rx)[..],
            [StateEvent::QuietChanged { quiet: false, label: "Quiet" }]
        ));
    }

    #[test]
    fn test_connection_toggle_swaps_icon_only() {
        let (mut sm, mut rx) = create_state_machine(false);
        sm.handle_event(TrayEvent::SelectLayer(1));
        drain(&mut rx);

        sm.handle_event(TrayEvent::ToggleConnection);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            StateEvent::IconChanged { variant: IconVariant::Disconnected, icon }
                if &icon[..] == b"disconnected"
        ));
        assert_eq!(sm.state().layer_name(), "Office");
        assert!(!sm.state().is_connected());

        sm.handle_event(TrayEvent::ToggleConnection);
        let events = drain(&mut rx);
        assert_eq!(icon_of(&events[0]), Some(&b"office-light"[..]));
    }

    #[test]
    fn test_dark_mode_uses_dark_icon() {
        let (mut sm, mut rx) = create_state_machine(true);

        sm.handle_event(TrayEvent::SelectLayer(1));

        let events = drain(&mut rx);
        assert_eq!(icon_of(&events[0]), Some(&b"office-dark"[..]));
    }

    #[test]
    fn test_info_reports_layer_or_disconnected() {
        let (mut sm, mut rx) = create_state_machine(false);
        sm.handle_event(TrayEvent::SelectLayer(1));
        drain(&mut rx);

        sm.handle_event(TrayEvent::Info);
        assert!(matches!(
            &drain(&mut rx)[..],
            [StateEvent::Notify { summary, .. }] if summary == "Office"
        ));

        sm.handle_event(TrayEvent::ToggleConnection);
        drain(&mut rx);
        sm.handle_event(TrayEvent::Info);
        assert!(matches!(
            &drain(&mut rx)[..],
            [StateEvent::Notify { summary, .. }] if summary == "Disconnected"
        ));
        assert_eq!(sm.state().layer(), LayerState::Active(1));
    }

    #[test]
    fn test_quit_stops_processing() {
        let (mut sm, mut rx) = create_state_machine(false);

        assert_eq!(sm.handle_event(TrayEvent::Quit), Flow::Quit);
        assert!(sm.state().is_quitting());

        assert_eq!(sm.handle_event(TrayEvent::SelectLayer(1)), Flow::Quit);
        assert_eq!(sm.state().layer(), LayerState::Idle);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_restore_matching_snapshot_is_silent() {
        let (mut sm, mut rx) = create_state_machine(false);

        let applied = sm.restore(Some(SaveState {
            id: 1,
            name: "Office".to_string(),
            is_connected: false,
            quiet: true,
        }));

        assert!(applied);
        assert_eq!(sm.state().layer(), LayerState::Active(1));
        assert!(!sm.state().is_connected());
        assert!(sm.state().is_quiet());

        let events = drain(&mut rx);
        assert_eq!(notifications(&events), 0);
        assert_eq!(icon_of(&events[0]), Some(&b"disconnected"[..]));
        assert!(matches!(&events[1], StateEvent::TitleChanged { title } if title == "Office Layer"));
        assert!(matches!(events[2], StateEvent::QuietChanged { quiet: true, .. }));
    }

    #[test]
    fn test_restore_mismatch_keeps_defaults() {
        let (mut sm, mut rx) = create_state_machine(false);

        let applied = sm.restore(Some(SaveState {
            id: 1,
            name: "Gaming".to_string(),
            is_connected: false,
            quiet: true,
        }));

        assert!(!applied);
        assert_eq!(sm.state().layer(), LayerState::Idle);
        assert_eq!(sm.state().layer_id(), 0);
        assert!(sm.state().is_connected());
        assert!(!sm.state().is_quiet());

        let events = drain(&mut rx);
        assert_eq!(icon_of(&events[0]), Some(&b"gaming-light"[..]));
        assert!(matches!(&events[1], StateEvent::TitleChanged { title } if title == "Gaming Layer"));
    }

    #[test]
    fn test_restore_without_snapshot_paints_default() {
        let (mut sm, mut rx) = create_state_machine(false);

        assert!(!sm.restore(None));
        assert_eq!(drain(&mut rx).len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_selects_serialize() {
        for _ in 0..20 {
            let (mut sm, mut rx) = create_state_machine(false);
            let (tx, event_rx) = mpsc::channel(8);

            let machine = tokio::spawn(async move {
                sm.run(event_rx).await;
                sm
            });

            let a = tokio::spawn({
                let tx = tx.clone();
                async move { tx.send(TrayEvent::SelectLayer(0)).await }
            });
            let b = tokio::spawn({
                let tx = tx.clone();
                async move { tx.send(TrayEvent::SelectLayer(1)).await }
            });
            a.await.unwrap().unwrap();
            b.await.unwrap().unwrap();
            tx.send(TrayEvent::Quit).await.unwrap();

            let sm = machine.await.unwrap();
            let state = sm.state();
            let expected: &[u8] = match state.layer() {
                LayerState::Active(0) => b"gaming-light",
                LayerState::Active(1) => b"office-light",
                other => panic!("unexpected layer {other:?}"),
            };

            let events = drain(&mut rx);
            let last_icon = events.iter().rev().find_map(icon_of);
            assert_eq!(last_icon, Some(expected));
            assert_eq!(SaveState::from(state).id, state.layer_id());
        }
    }
}
