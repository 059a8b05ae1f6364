//! Tray host used when no StatusNotifier watcher is available

use tracing::info;

use crate::icons::IconBytes;

use super::TrayHost;

/// Logs what a tray would show
#[derive(Debug, Default)]
pub struct HeadlessTray;

impl TrayHost for HeadlessTray {
    async fn set_icon(&self, icon: IconBytes) {
        info!(bytes = icon.len(), "tray icon");
    }

    async fn set_title(&self, title: String) {
        info!(%title, "tray title");
    }

    async fn set_quiet_label(&self, label: &'static str) {
        info!(label, "tray quiet label");
    }
}
