//! Desktop notifications via notify-rust

use notify_rust::Notification;
use tracing::warn;

use super::Notifier;

const APP_NAME: &str = "kb-layer-tray";

/// Shows notifications without blocking the presenter
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&self, summary: &str, body: &str) {
        let summary = summary.to_string();
        let body = body.to_string();

        tokio::task::spawn_blocking(move || {
            let shown = Notification::new()
                .appname(APP_NAME)
                .summary(&summary)
                .body(&body)
                .show()
                .map(|_| ());

            if let Err(e) = shown {
                warn!(error = %e, %summary, "failed to show notification");
            }
        });
    }
}
