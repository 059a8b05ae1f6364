//! kb-layer-tray: mirrors the active keyboard layer in the system tray
//!
//! Each configured layer is bound to a global hotkey that the keyboard
//! firmware sends when it switches layer. This process:
//! - Registers one hotkey per layer, plus info and connection-toggle keys
//! - Runs a single state machine that owns the current layer state
//! - Drives the tray icon, title and notifications from its transitions
//! - Restores the last layer on startup and saves it on exit

mod config;
mod events;
mod hotkey;
mod icons;
mod lifecycle;
mod logging;
mod registry;
mod state;
mod tray;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::{broadcast, mpsc};
use tracing::{error, info, warn};

use crate::config::{AppPaths, Config};
use crate::events::{StateEvent, TrayEvent};
use crate::hotkey::GlobalHotkeyBackend;
use crate::icons::{IconResolver, DISCONNECTED_PRESET};
use crate::lifecycle::ShutdownSignal;
use crate::registry::{LayerRegistry, Registry};
use crate::state::{StateMachine, StateStore, TrayState};
use crate::tray::{DesktopNotifier, DesktopTray};

#[tokio::main]
async fn main() -> Result<()> {
    let paths = AppPaths::discover();
    paths.ensure_dirs().context("failed to create app directories")?;

    // Initialize logging
    logging::init(&paths.log_file());

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "kb-layer-tray starting"
    );

    // Load configuration; unreadable, corrupt or empty configs are fatal
    let config_file = paths.config_file();
    let config = match Config::load_or_create(&config_file) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return Err(e.into());
        }
    };
    info!(?config_file, layers = config.layers.len(), "configuration loaded");

    let icons = IconResolver::new(&paths.config_dir);
    let disconnect_icon = icons.resolve_or(&config.disconnect_icon, DISCONNECTED_PRESET);

    let backend = GlobalHotkeyBackend::new().context("hotkey subsystem unavailable")?;

    let registry = LayerRegistry::new(&backend, &icons).build(&config);
    if registry.layer_count() == 0 {
        warn!("no layer hotkeys could be registered");
    }
    for failure in &registry.global_failures {
        warn!(error = %failure, "continuing without this feature");
    }
    let Registry {
        bindings, listeners, ..
    } = registry;

    // Channels for inter-component communication
    // Listeners and menu -> state machine
    let (event_tx, event_rx) = mpsc::channel::<TrayEvent>(32);
    // State machine -> tray and notifications
    let (state_tx, state_rx) = broadcast::channel::<StateEvent>(64);

    let quitting = Arc::new(AtomicBool::new(false));
    let tray_state = TrayState::new(
        bindings,
        disconnect_icon,
        config.dark_mode,
        Arc::clone(&quitting),
    );
    let mut state_machine = StateMachine::new(tray_state, state_tx);

    // Replay the previous run before any live event
    let store = StateStore::new(paths.state_file());
    state_machine.restore(store.load());

    let _listeners = hotkey::spawn_all(listeners, &event_tx, &quitting);
    ShutdownSignal::new().forward_to(event_tx.clone());

    let desktop_tray = DesktopTray::connect(event_tx, Arc::clone(&quitting), config_file).await;
    let notifier = DesktopNotifier;

    info!("initialized, entering main loop");

    tokio::select! {
        _ = state_machine.run(event_rx) => {}
        _ = tray::present(&desktop_tray, &notifier, state_rx) => {
            warn!("presenter exited");
        }
    }

    lifecycle::shutdown(&backend, state_machine.into_state(), &store);
    desktop_tray.shutdown().await;

    info!("kb-layer-tray stopped");

    Ok(())
}
