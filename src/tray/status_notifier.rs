//! System tray via the D-Bus StatusNotifierItem protocol

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ksni::menu::{MenuItem, StandardItem};
use ksni::TrayMethods;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config;
use crate::events::TrayEvent;
use crate::icons::IconBytes;

use super::pixmap::decode_argb;
use super::TrayHost;

const TRAY_ID: &str = "kb-layer-tray";
const TOOL_TIP: &str = "Keyboard Status";

/// Tray model rendered by the StatusNotifier host
pub struct LayerTray {
    title: String,
    icon: Vec<ksni::Icon>,
    quiet_label: &'static str,
    event_tx: mpsc::Sender<TrayEvent>,
    quitting: Arc<AtomicBool>,
    config_file: PathBuf,
    runtime: Handle,
}

impl LayerTray {
    pub fn new(
        event_tx: mpsc::Sender<TrayEvent>,
        quitting: Arc<AtomicBool>,
        config_file: PathBuf,
        runtime: Handle,
    ) -> Self {
        Self {
            title: String::new(),
            icon: Vec::new(),
            quiet_label: crate::state::quiet_label(false),
            event_tx,
            quitting,
            config_file,
            runtime,
        }
    }

    /// Queue a menu event, waiting for room rather than dropping it
    fn send(&self, event: TrayEvent) -> JoinHandle<()> {
        let event_tx = self.event_tx.clone();
        let quitting = Arc::clone(&self.quitting);
        self.runtime.spawn(async move {
            if quitting.load(Ordering::SeqCst) {
                return;
            }
            if event_tx.send(event).await.is_err() {
                debug!(?event, "state machine gone, menu event dropped");
            }
        })
    }
}

impl ksni::Tray for LayerTray {
    fn id(&self) -> String {
        TRAY_ID.into()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            title: TOOL_TIP.into(),
            ..Default::default()
        }
    }

    fn icon_pixmap(&self) -> Vec<ksni::Icon> {
        self.icon.clone()
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        vec![
            StandardItem {
                label: self.title.clone(),
                enabled: false,
                ..Default::default()
            }
            .into(),
            MenuItem::Separator,
            StandardItem {
                label: "Configure".into(),
                activate: Box::new(|this: &mut LayerTray| {
                    if let Err(e) = config::open_in_default_handler(&this.config_file) {
                        warn!(error = %e, path = ?this.config_file, "failed to open config");
                    }
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: self.quiet_label.into(),
                activate: Box::new(|this: &mut LayerTray| {
                    this.send(TrayEvent::ToggleQuiet);
                }),
                ..Default::default()
            }
            .into(),
            StandardItem {
                label: "Quit".into(),
                activate: Box::new(|this: &mut LayerTray| {
                    this.send(TrayEvent::Quit);
                }),
                ..Default::default()
            }
            .into(),
        ]
    }
}

/// Live handle to the spawned tray
pub struct StatusNotifierTray {
    handle: ksni::Handle<LayerTray>,
}

impl StatusNotifierTray {
    /// Register the tray with the session bus
    pub async fn spawn(tray: LayerTray) -> Result<Self, ksni::Error> {
        let handle = tray.spawn().await?;
        Ok(Self { handle })
    }

    async fn update(&self, f: impl FnOnce(&mut LayerTray) + Send + 'static) {
        if self.handle.update(f).await.is_none() {
            debug!("tray service gone, update dropped");
        }
    }

    pub async fn shutdown(&self) {
        self.handle.shutdown().await;
    }
}

impl TrayHost for StatusNotifierTray {
    async fn set_icon(&self, icon: IconBytes) {
        match decode_argb(&icon) {
            Ok(pixmap) => {
                let icon = ksni::Icon {
                    width: pixmap.width as i32,
                    height: pixmap.height as i32,
                    data: pixmap.argb,
                };
                self.update(move |tray| tray.icon = vec![icon]).await;
            }
            Err(e) => warn!(error = %e, "icon is not a decodable PNG, keeping previous"),
        }
    }

    async fn set_title(&self, title: String) {
        self.update(move |tray| tray.title = title).await;
    }

    async fn set_quiet_label(&self, label: &'static str) {
        self.update(move |tray| tray.quiet_label = label).await;
    }
}
