use std::env;

use serde::{Deserialize, Serialize};

pub mod history;
pub mod languages;
pub mod translator;
pub mod updater;

pub use history::HistoryConfig;
pub use languages::LANGUAGES;
pub use translator::TranslatorConfig;
pub use updater::UpdaterConfig;

#[derive(Serialize, Deserialize)]
pub struct Config {
    pub translator: TranslatorConfig,
    pub history: HistoryConfig,
    pub updater: UpdaterConfig,

    /// Two qualifying presses closer than this fire the gesture.
    pub double_press_window_ms: u64,
    /// Quiet period before an auto-translate fires.
    pub auto_translate_debounce_ms: u64,
    /// Delay between the gesture firing and the clipboard read, so the
    /// source application has finished writing the copy.
    pub trigger_delay_ms: u64,
    pub cli_timeout_secs: u64,
    pub api_timeout_secs: u64,
}

impl Config {
    pub fn new() -> Self {
        let double_press_window_ms = env::var("KOPI_DOUBLE_PRESS_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(500);

        let auto_translate_debounce_ms = env::var("KOPI_DEBOUNCE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let trigger_delay_ms = env::var("KOPI_TRIGGER_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let cli_timeout_secs = env::var("KOPI_CLI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let api_timeout_secs = env::var("KOPI_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Config {
            translator: TranslatorConfig::default(),
            history: HistoryConfig::new(),
            updater: UpdaterConfig::default(),

            double_press_window_ms,
            auto_translate_debounce_ms,
            trigger_delay_ms,
            cli_timeout_secs,
            api_timeout_secs,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
