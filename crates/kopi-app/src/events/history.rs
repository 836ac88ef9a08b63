use std::sync::Arc;

use kanal::AsyncSender;
use kopi_history::HistoryStore;
use kopi_types::AppEvent;

pub async fn handle_delete_entry(
    history: Option<&Arc<HistoryStore>>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    id: i64,
) -> anyhow::Result<()> {
    let Some(store) = history else {
        return Ok(());
    };
    match store.delete(id) {
        Ok(()) => {
            let _ = app_to_ui_tx.send(AppEvent::HistoryChanged).await;
        }
        Err(e) => tracing::error!(id, "failed to delete history entry: {e}"),
    }
    Ok(())
}

pub async fn handle_clear_history(
    history: Option<&Arc<HistoryStore>>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let Some(store) = history else {
        return Ok(());
    };
    match store.delete_all() {
        Ok(()) => {
            tracing::info!("history cleared");
            let _ = app_to_ui_tx.send(AppEvent::HistoryChanged).await;
        }
        Err(e) => tracing::error!("failed to clear history: {e}"),
    }
    Ok(())
}

/// Empty query lists everything, newest first.
pub async fn handle_search_history(
    history: Option<&Arc<HistoryStore>>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    query: &str,
) -> anyhow::Result<()> {
    let Some(store) = history else {
        let _ = app_to_ui_tx.send(AppEvent::HistoryResults(Vec::new())).await;
        return Ok(());
    };
    let filter = {
        let trimmed = query.trim();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    };
    match store.list(filter) {
        Ok(entries) => {
            let _ = app_to_ui_tx.send(AppEvent::HistoryResults(entries)).await;
        }
        Err(e) => tracing::error!("history search failed: {e}"),
    }
    Ok(())
}
