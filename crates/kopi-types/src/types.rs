use std::time::Instant;

use serde::{Deserialize, Serialize};

/// Key identity as delivered by the OS hook.
///
/// `Code` carries a platform virtual key code (macOS delivers the `c` key
/// as keycode 8); `Char` carries the character representation used by the
/// listener-thread platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ModifierLeft,
    ModifierRight,
    Char(char),
    Code(u16),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// Transient key event. Produced by the hook, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    pub at: Instant,
}

impl KeyEvent {
    pub fn press(key: Key, at: Instant) -> Self {
        Self {
            key,
            action: KeyAction::Press,
            at,
        }
    }

    pub fn release(key: Key, at: Instant) -> Self {
        Self {
            key,
            action: KeyAction::Release,
            at,
        }
    }
}

/// Where a translation request originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextSource {
    DoubleCopy,
    Manual,
    Auto,
}

/// Immutable once constructed; `text` is trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub model: String,
}

impl TranslationRequest {
    /// Returns `None` when the trimmed text is empty.
    pub fn new(text: &str, source_lang: &str, target_lang: &str, model: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            model: model.to_string(),
        })
    }
}

/// One row of the translation history, newest-first when listed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: i64,
    pub src_text: String,
    pub tgt_text: String,
    pub src_lang: String,
    pub tgt_lang: String,
    pub model: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Copy shortcut pressed twice within the gesture window.
    DoubleCopy,
    /// Source text edited at the UI boundary (feeds the debounce timer).
    SourceChanged(String),
    Translate {
        text: String,
        source: TextSource,
    },
    ShowTranslation {
        text: String,
        request: TranslationRequest,
    },
    TranslationFailed {
        message: String,
    },
    HistoryChanged,
    HistoryResults(Vec<HistoryEntry>),
    DeleteHistoryEntry(i64),
    ClearHistory,
    SearchHistory(String),
    CopyResult(String),
    /// A newer commit exists upstream; the UI offers install or skip.
    UpdateAvailable(String),
    StartUpdate,
    SkipVersion(String),
    UpdateProgress(String),
    UpdateFinished,
    UpdateFailed(String),
    Quit,
}
