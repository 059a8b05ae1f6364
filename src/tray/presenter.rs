//! Applies state machine side effects to the desktop sinks

use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::events::StateEvent;

use super::{Notifier, TrayHost};

/// Apply state events until the state machine goes away
pub async fn present<T: TrayHost, N: Notifier>(
    tray: &T,
    notifier: &N,
    mut event_rx: broadcast::Receiver<StateEvent>,
) {
    loop {
        match event_rx.recv().await {
            Ok(event) => {
                debug!(%event, "presenting state event");
                match event {
                    StateEvent::IconChanged { icon, .. } => tray.set_icon(icon).await,
                    StateEvent::TitleChanged { title } => tray.set_title(title).await,
                    StateEvent::QuietChanged { label, .. } => tray.set_quiet_label(label).await,
                    StateEvent::Notify { summary, body } => notifier.notify(&summary, &body),
                }
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(skipped = n, "presenter lagged behind state events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
