//! Per-binding listener tasks
//!
//! Each registered binding gets its own task blocking on its key-down
//! source. Listeners never touch state; they forward an event to the
//! state machine's channel, which serializes all transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::events::TrayEvent;
use crate::registry::Listener;

/// Spawn one listener task for a registered binding.
///
/// The task exits when the key-down source closes, when the state machine
/// channel closes, or on the first key-down after `quitting` is set.
pub fn spawn_listener(
    listener: Listener,
    event_tx: mpsc::Sender<TrayEvent>,
    quitting: Arc<AtomicBool>,
) -> JoinHandle<()> {
    let Listener { kind, mut keydown } = listener;
    let event = TrayEvent::from(kind);

    tokio::spawn(async move {
        debug!(%kind, "listener started");

        while keydown.next().await.is_some() {
            if quitting.load(Ordering::SeqCst) {
                break;
            }

            if event_tx.send(event).await.is_err() {
                break;
            }
        }

        info!(%kind, "listener stopped");
    })
}

/// Spawn listeners for every binding
pub fn spawn_all(
    listeners: Vec<Listener>,
    event_tx: &mpsc::Sender<TrayEvent>,
    quitting: &Arc<AtomicBool>,
) -> Vec<JoinHandle<()>> {
    listeners
        .into_iter()
        .map(|l| spawn_listener(l, event_tx.clone(), Arc::clone(quitting)))
        .collect()
}
