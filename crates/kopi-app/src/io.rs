use std::sync::Arc;
use std::time::Duration;

use kanal::AsyncSender;
use kopi_types::AppEvent;
use tokio_util::sync::CancellationToken;

use crate::state::AppState;

/// Installs the double-copy key hook and keeps it alive until shutdown.
///
/// Install failure is logged once and the task idles; the app stays
/// usable through the UI path without the gesture.
pub async fn hook_io(
    state: Arc<AppState>,
    cancel: CancellationToken,
    event_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let window = {
        let config = state.config.read().await;
        Duration::from_millis(config.double_press_window_ms)
    };

    // The detector callback runs on the hook thread; hand the event to
    // the runtime instead of blocking there.
    let handle = tokio::runtime::Handle::current();
    let tx = event_tx.clone();
    let hook = kopi_hotkey::spawn_hook(window, move || {
        let tx = tx.clone();
        handle.spawn(async move {
            if let Err(e) = tx.send(AppEvent::DoubleCopy).await {
                tracing::error!("failed to queue double-copy gesture: {e}");
            }
        });
    });

    match hook {
        Ok(_hook) => {
            tracing::info!("double-copy hook installed");
            cancel.cancelled().await;
            tracing::info!("double-copy hook stopping");
        }
        Err(e) => {
            tracing::error!("double-copy hook unavailable: {e:#}");
            cancel.cancelled().await;
        }
    }

    Ok(())
}
