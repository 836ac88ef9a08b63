use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use kopi_history::HistoryStore;
use kopi_translator::TranslationClient;
use kopi_types::AppEvent;
use kopi_updater::Updater;
use tokio_util::sync::CancellationToken;

use crate::debounce::DebounceTrigger;
use crate::state::AppState;

pub mod double_copy;
pub mod history;
pub mod translate;

use double_copy::handle_double_copy;
use history::{handle_clear_history, handle_delete_entry, handle_search_history};
use translate::handle_translate;

/// App's main loop: the only consumer of `ui_to_app`, so translation
/// completion order matches delivery order.
pub async fn event_loop(
    state: Arc<AppState>,
    ui_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<AppEvent>,
    loopback_tx: AsyncSender<AppEvent>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    // Collaborators built once, up front.
    let history = {
        let config = state.config.read().await;
        match HistoryStore::open(&config.history.db_path, config.history.max_entries) {
            Ok(store) => Some(Arc::new(store)),
            Err(e) => {
                tracing::error!("history store unavailable, not recording: {e}");
                None
            }
        }
    };

    let translator = {
        let config = state.config.read().await;
        Arc::new(TranslationClient::new(
            Duration::from_secs(config.cli_timeout_secs),
            Duration::from_secs(config.api_timeout_secs),
        ))
    };

    let updater = {
        let config = state.config.read().await;
        Arc::new(Updater::new(&config.updater))
    };

    // Startup update check; quiet unless something is actually newer.
    {
        let updater = updater.clone();
        let tx = loopback_tx.clone();
        tokio::spawn(async move {
            if let Some(sha) = updater.check_for_update().await {
                let _ = tx.send(AppEvent::UpdateAvailable(sha)).await;
            }
        });
    }

    let mut debounce = {
        let config = state.config.read().await;
        DebounceTrigger::new(
            Duration::from_millis(config.auto_translate_debounce_ms),
            loopback_tx.clone(),
        )
    };

    tracing::info!("event loop started, waiting for events");
    loop {
        let event = tokio::select! {
            event = ui_to_app_rx.recv() => event?,
            _ = cancel.cancelled() => {
                tracing::info!("event loop stopping");
                return Ok(());
            }
        };

        handle_event(
            &state,
            history.as_ref(),
            &translator,
            &updater,
            &app_to_ui_tx,
            &loopback_tx,
            &mut debounce,
            &cancel,
            event,
        )
        .await?;
    }
}

#[allow(clippy::too_many_arguments)]
pub(crate) async fn handle_event(
    state: &Arc<AppState>,
    history: Option<&Arc<HistoryStore>>,
    translator: &Arc<TranslationClient>,
    updater: &Arc<Updater>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    loopback_tx: &AsyncSender<AppEvent>,
    debounce: &mut DebounceTrigger,
    cancel: &CancellationToken,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::DoubleCopy => {
            // The gesture re-translates the clipboard; stale edits must
            // not fire on top of it.
            debounce.suppress(true);
            handle_double_copy(state.clone(), loopback_tx).await?;
        }
        AppEvent::SourceChanged(text) => {
            if !state.translating.load(Ordering::SeqCst) {
                debounce.suppress(false);
            }
            debounce.notify(text);
        }
        AppEvent::Translate { text, source } => {
            handle_translate(
                state.clone(),
                history.cloned(),
                translator.clone(),
                app_to_ui_tx,
                text,
                source,
            )
            .await?;
        }
        AppEvent::DeleteHistoryEntry(id) => {
            handle_delete_entry(history, app_to_ui_tx, id).await?;
        }
        AppEvent::ClearHistory => {
            handle_clear_history(history, app_to_ui_tx).await?;
        }
        AppEvent::SearchHistory(query) => {
            handle_search_history(history, app_to_ui_tx, &query).await?;
        }
        AppEvent::CopyResult(text) => {
            let written = tokio::task::spawn_blocking(move || {
                let mut clipboard = kopi_io::Clipboard::new()?;
                clipboard.write_text(&text)
            })
            .await;
            match written {
                Ok(Ok(())) => tracing::debug!("translation copied to clipboard"),
                Ok(Err(e)) => tracing::warn!("clipboard write failed: {e:#}"),
                Err(e) => tracing::error!("clipboard task panicked: {e}"),
            }
        }
        AppEvent::UpdateAvailable(sha) => {
            tracing::info!(sha = %sha, "update available");
            let _ = app_to_ui_tx.send(AppEvent::UpdateAvailable(sha)).await;
        }
        AppEvent::StartUpdate => {
            if state.updating.swap(true, Ordering::SeqCst) {
                tracing::warn!("update already running, ignoring");
            } else {
                updater.run_update(loopback_tx.clone());
            }
        }
        AppEvent::SkipVersion(sha) => {
            if let Err(e) = updater.skip_version(&sha) {
                tracing::warn!("failed to record skipped version: {e:#}");
            }
        }
        AppEvent::UpdateProgress(message) => {
            let _ = app_to_ui_tx.send(AppEvent::UpdateProgress(message)).await;
        }
        AppEvent::UpdateFinished => {
            state.updating.store(false, Ordering::SeqCst);
            let _ = app_to_ui_tx.send(AppEvent::UpdateFinished).await;
        }
        AppEvent::UpdateFailed(message) => {
            state.updating.store(false, Ordering::SeqCst);
            let _ = app_to_ui_tx.send(AppEvent::UpdateFailed(message)).await;
        }
        AppEvent::Quit => {
            if state.updating.load(Ordering::SeqCst) {
                tracing::warn!("update in progress, refusing to quit");
                let _ = app_to_ui_tx
                    .send(AppEvent::UpdateProgress(
                        "update in progress, please wait before quitting".to_string(),
                    ))
                    .await;
            } else {
                cancel.cancel();
            }
        }
        AppEvent::ShowTranslation { .. }
        | AppEvent::TranslationFailed { .. }
        | AppEvent::HistoryChanged
        | AppEvent::HistoryResults(_) => {
            // UI-only events, ignore in backend
        }
    }

    Ok(())
}
