use std::sync::Arc;
use std::time::SystemTime;

use kanal::{AsyncReceiver, AsyncSender};
use kopi_config::Config;
use kopi_types::AppEvent;
use tokio::sync::RwLock;

use crate::status::AppStatus;

/// UI boundary: the only consumer of `app_to_ui`. Real widgets hang off
/// this loop and send their interactions through `ui_to_app`; without
/// them it keeps the status mirror and the log lines current.
pub async fn ui_loop(
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    _ui_to_app_tx: AsyncSender<AppEvent>,
    _config: Arc<RwLock<Config>>,
) -> anyhow::Result<()> {
    let status = AppStatus::new();
    let mut credential_hint_shown = false;

    loop {
        let event = app_to_ui_rx.recv().await?;
        apply(&status, &mut credential_hint_shown, event).await;
    }
}

pub(crate) async fn apply(status: &AppStatus, credential_hint_shown: &mut bool, event: AppEvent) {
    match event {
        AppEvent::ShowTranslation { text, request } => {
            let mut translation = status.translation.write().await;
            translation.translating = false;
            translation.current_message = format!("translated with {}", request.model);
            translation.last_result = Some(text);
            translation.last_translated_at = Some(SystemTime::now());
            drop(translation);
            tracing::info!(model = %request.model, "translation ready");
        }
        AppEvent::TranslationFailed { message } => {
            let mut translation = status.translation.write().await;
            translation.translating = false;
            translation.error_count += 1;
            translation.current_message = format!("error: {message}");
            drop(translation);
            tracing::warn!("translation failed: {message}");
            if !*credential_hint_shown && message.contains("environment variable is not set") {
                *credential_hint_shown = true;
                tracing::info!(
                    "export the API key or put it in a .env file next to the binary"
                );
            }
        }
        AppEvent::HistoryChanged => {
            tracing::debug!("history changed");
        }
        AppEvent::HistoryResults(entries) => {
            tracing::info!(count = entries.len(), "history results ready");
        }
        AppEvent::UpdateAvailable(sha) => {
            tracing::info!(sha = %sha, "update available, install or skip from the update menu");
        }
        AppEvent::UpdateProgress(message) => {
            let mut translation = status.translation.write().await;
            translation.current_message = message.clone();
            drop(translation);
            tracing::info!("{message}");
        }
        AppEvent::UpdateFinished => {
            tracing::info!("update installed, restart to apply");
        }
        AppEvent::UpdateFailed(message) => {
            tracing::error!("update failed: {message}");
        }
        AppEvent::DoubleCopy
        | AppEvent::SourceChanged(_)
        | AppEvent::Translate { .. }
        | AppEvent::DeleteHistoryEntry(_)
        | AppEvent::ClearHistory
        | AppEvent::SearchHistory(_)
        | AppEvent::CopyResult(_)
        | AppEvent::StartUpdate
        | AppEvent::SkipVersion(_)
        | AppEvent::Quit => {
            // Backend-only events, ignore at the UI boundary
        }
    }
}
