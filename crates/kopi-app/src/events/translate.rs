use std::sync::Arc;
use std::sync::atomic::Ordering;

use kanal::AsyncSender;
use kopi_history::HistoryStore;
use kopi_translator::{TranslateError, TranslationClient};
use kopi_types::{AppEvent, TextSource, TranslationRequest};

use crate::state::AppState;

/// Queues one translation at a time. A request arriving while another is
/// in flight is dropped with a warning; the gate clears when the worker
/// finishes, success or not.
pub async fn handle_translate(
    state: Arc<AppState>,
    history: Option<Arc<HistoryStore>>,
    translator: Arc<TranslationClient>,
    app_to_ui_tx: &AsyncSender<AppEvent>,
    text: String,
    source: TextSource,
) -> anyhow::Result<()> {
    let request = {
        let config = state.config.read().await;
        TranslationRequest::new(
            &text,
            &config.translator.source_lang,
            &config.translator.target_lang,
            &config.translator.model,
        )
    };
    let Some(request) = request else {
        let _ = app_to_ui_tx
            .send(AppEvent::TranslationFailed {
                message: TranslateError::EmptyInput.to_string(),
            })
            .await;
        return Ok(());
    };

    if state.translating.swap(true, Ordering::SeqCst) {
        tracing::warn!(?source, "translation already in flight, dropping request");
        return Ok(());
    }

    tracing::info!(
        ?source,
        model = %request.model,
        chars = request.text.len(),
        "translating"
    );

    let tx = app_to_ui_tx.clone();
    tokio::spawn(async move {
        match translator.translate(&request).await {
            Ok(translation) => {
                if let Some(store) = &history {
                    match store.append(
                        &request.text,
                        &translation,
                        &request.source_lang,
                        &request.target_lang,
                        &request.model,
                    ) {
                        Ok(_) => {
                            let _ = tx.send(AppEvent::HistoryChanged).await;
                        }
                        Err(e) => tracing::error!("failed to record history: {e}"),
                    }
                }
                let _ = tx
                    .send(AppEvent::ShowTranslation {
                        text: translation,
                        request,
                    })
                    .await;
            }
            Err(e) => {
                tracing::warn!("translation failed: {e}");
                let _ = tx
                    .send(AppEvent::TranslationFailed {
                        message: e.to_string(),
                    })
                    .await;
            }
        }
        state.translating.store(false, Ordering::SeqCst);
    });

    Ok(())
}
