use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use kopi_types::{AppEvent, TextSource};

use crate::state::AppState;

/// Double-copy gesture: wait for the source app to finish writing the
/// clipboard, read it once, and queue a translation.
pub async fn handle_double_copy(
    state: Arc<AppState>,
    loopback_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let delay = {
        let config = state.config.read().await;
        Duration::from_millis(config.trigger_delay_ms)
    };
    tokio::time::sleep(delay).await;

    let read = tokio::task::spawn_blocking(|| {
        let mut clipboard = kopi_io::Clipboard::new()?;
        clipboard.read_text()
    })
    .await;

    match read {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            let _ = loopback_tx
                .send(AppEvent::Translate {
                    text,
                    source: TextSource::DoubleCopy,
                })
                .await;
        }
        Ok(Ok(_)) => {
            tracing::debug!("clipboard empty after double-copy, ignoring");
        }
        Ok(Err(e)) => {
            tracing::warn!("clipboard read failed: {e:#}");
        }
        Err(e) => {
            tracing::error!("clipboard task panicked: {e}");
        }
    }

    Ok(())
}
