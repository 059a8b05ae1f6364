//! Signal handling and the ordered shutdown sequence

use std::io;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::events::TrayEvent;
use crate::hotkey::HotkeyBackend;
use crate::state::{SaveState, StateStore, TrayState};

/// Handles shutdown signals (SIGTERM, SIGINT)
pub struct ShutdownSignal;

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self
    }

    /// Wait for a shutdown signal
    #[cfg(unix)]
    pub async fn wait(&self) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        tokio::select! {
            _ = sigterm.recv() => {
                debug!("received SIGTERM");
            }
            _ = sigint.recv() => {
                debug!("received SIGINT");
            }
        }
        Ok(())
    }

    /// Wait for a shutdown signal
    #[cfg(not(unix))]
    pub async fn wait(&self) -> io::Result<()> {
        tokio::signal::ctrl_c().await?;
        debug!("received Ctrl-C");
        Ok(())
    }

    /// Turn the next signal into a Quit event so the normal shutdown runs
    pub fn forward_to(self, event_tx: mpsc::Sender<TrayEvent>) {
        tokio::spawn(async move {
            match self.wait().await {
                Ok(()) => {
                    info!("shutdown signal received");
                    let _ = event_tx.send(TrayEvent::Quit).await;
                }
                Err(e) => warn!(error = %e, "failed to install signal handlers"),
            }
        });
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Release every hotkey, then persist the final state.
///
/// Unregistration happens strictly before the save so no listener can
/// change state after the snapshot. Each failure is logged and the
/// sequence continues.
pub fn shutdown<B: HotkeyBackend>(backend: &B, mut state: TrayState, store: &StateStore) {
    info!("shutting down...");

    for binding in state.bindings_mut() {
        if let Some(handle) = binding.take_handle() {
            if let Err(e) = backend.unregister(handle) {
                warn!(kind = %binding.kind, name = %binding.name, error = %e, "failed to unregister hotkey");
            }
        }
    }

    info!(final_state = ?SaveState::from(&state), "final state");
    store.save(&state);
}
