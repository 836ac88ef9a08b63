use std::time::Duration;

use kanal::AsyncSender;
use kopi_types::{AppEvent, TextSource};
use tokio::task::JoinHandle;

/// Coalesces source-text edits into one auto-translation.
///
/// Every `notify` replaces the pending timer, so the request fires a full
/// delay after the last edit. Suppression hard-disables the trigger,
/// aborting any timer already armed.
pub struct DebounceTrigger {
    delay: Duration,
    tx: AsyncSender<AppEvent>,
    pending: Option<JoinHandle<()>>,
    suppressed: bool,
}

impl DebounceTrigger {
    pub fn new(delay: Duration, tx: AsyncSender<AppEvent>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
            suppressed: false,
        }
    }

    pub fn notify(&mut self, text: String) {
        if self.suppressed {
            return;
        }
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let event = AppEvent::Translate {
                text,
                source: TextSource::Auto,
            };
            if let Err(e) = tx.send(event).await {
                tracing::error!("failed to queue auto translation: {e}");
            }
        }));
    }

    pub fn suppress(&mut self, on: bool) {
        self.suppressed = on;
        if on && let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }
}

impl Drop for DebounceTrigger {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}
