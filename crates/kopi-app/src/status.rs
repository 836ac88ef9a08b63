use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

/// Translation pane status information
#[derive(Clone, Debug, Default)]
pub struct TranslationStatus {
    pub translating: bool,
    pub last_result: Option<String>,
    pub last_translated_at: Option<SystemTime>,
    pub error_count: u64,
    pub current_message: String,
}

/// Application status
pub struct AppStatus {
    pub translation: Arc<RwLock<TranslationStatus>>,
}

impl AppStatus {
    pub fn new() -> Self {
        Self {
            translation: Arc::new(RwLock::new(TranslationStatus::default())),
        }
    }
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::new()
    }
}
