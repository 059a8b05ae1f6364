//! Tray and notification sinks
//!
//! The state machine never talks to the desktop. The presenter applies its
//! `StateEvent`s, in order, to a `TrayHost` and a `Notifier`.

mod headless;
mod notifier;
mod pixmap;
mod presenter;
#[cfg(target_os = "linux")]
mod status_notifier;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[cfg(target_os = "linux")]
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::events::TrayEvent;
use crate::icons::IconBytes;

pub use headless::HeadlessTray;
pub use notifier::DesktopNotifier;
pub use presenter::present;
#[cfg(target_os = "linux")]
pub use status_notifier::{LayerTray, StatusNotifierTray};

/// Where icon and label updates are rendered
pub trait TrayHost {
    async fn set_icon(&self, icon: IconBytes);
    async fn set_title(&self, title: String);
    async fn set_quiet_label(&self, label: &'static str);
}

/// Fire-and-forget desktop notifications
pub trait Notifier {
    fn notify(&self, summary: &str, body: &str);
}

/// The tray actually in use for this session
pub enum DesktopTray {
    #[cfg(target_os = "linux")]
    StatusNotifier(StatusNotifierTray),
    Headless(HeadlessTray),
}

impl DesktopTray {
    /// Create the StatusNotifier tray, or a headless one if that fails
    pub async fn connect(
        event_tx: mpsc::Sender<TrayEvent>,
        quitting: Arc<AtomicBool>,
        config_file: PathBuf,
    ) -> Self {
        #[cfg(target_os = "linux")]
        {
            let tray = LayerTray::new(event_tx, quitting, config_file, Handle::current());
            match StatusNotifierTray::spawn(tray).await {
                Ok(tray) => {
                    info!("tray icon created via ksni/D-Bus");
                    return DesktopTray::StatusNotifier(tray);
                }
                Err(e) => {
                    warn!(error = %e, "no StatusNotifier host, running headless");
                }
            }
        }

        #[cfg(not(target_os = "linux"))]
        {
            let _ = (event_tx, quitting, config_file);
            warn!("no tray host on this platform, running headless");
        }

        DesktopTray::Headless(HeadlessTray)
    }

    pub async fn shutdown(&self) {
        #[cfg(target_os = "linux")]
        {
            if let DesktopTray::StatusNotifier(tray) = self {
                tray.shutdown().await;
            }
        }
    }
}

impl TrayHost for DesktopTray {
    async fn set_icon(&self, icon: IconBytes) {
        match self {
            #[cfg(target_os = "linux")]
            DesktopTray::StatusNotifier(tray) => tray.set_icon(icon).await,
            DesktopTray::Headless(tray) => tray.set_icon(icon).await,
        }
    }

    async fn set_title(&self, title: String) {
        match self {
            #[cfg(target_os = "linux")]
            DesktopTray::StatusNotifier(tray) => tray.set_title(title).await,
            DesktopTray::Headless(tray) => tray.set_title(title).await,
        }
    }

    async fn set_quiet_label(&self, label: &'static str) {
        match self {
            #[cfg(target_os = "linux")]
            DesktopTray::StatusNotifier(tray) => tray.set_quiet_label(label).await,
            DesktopTray::Headless(tray) => tray.set_quiet_label(label).await,
        }
    }
}
